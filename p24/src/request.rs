//! Signed request envelope
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <request version="1.0">
//!   <merchant><id>…</id><signature>…</signature></merchant>
//!   <data>
//!     <payment id="…"><prop name="…" value="…"></prop>…</payment>
//!     <oper>cmt</oper><wait>0</wait><test>0</test>
//!   </data>
//! </request>
//! ```
//!
//! The `<data>` element is serialized once; the signature is computed over
//! its content and the same bytes are embedded into the envelope.

use crate::{extract::tag_content, signer::Merchant, signer::MerchantSign, Error, Result};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::{Cursor, Write};

/// XML declaration prepended to every request
pub const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// Envelope protocol version
pub const PROTOCOL_VERSION: &str = "1.0";

/// Default operation code
pub const DEFAULT_OPER: &str = "cmt";

/// Options shared by all merchant API requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonOpts {
    /// Operation code
    pub oper: String,
    /// Seconds the bank may wait for the answer
    pub wait: u32,
    /// 1 for a test request
    pub test: u32,
}

impl Default for CommonOpts {
    fn default() -> Self {
        Self {
            oper: DEFAULT_OPER.to_string(),
            wait: 0,
            test: 0,
        }
    }
}

/// Name/value property of the payment block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prop {
    /// Property name
    pub name: String,
    /// Property value
    pub value: String,
}

impl Prop {
    /// Create property
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Payment block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payment {
    /// Payment ID (empty for informational requests)
    pub id: String,
    /// Properties
    pub props: Vec<Prop>,
}

/// Operation payload carried in `<data>`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestData {
    /// Payment block
    pub payment: Payment,
    /// Common options; `None` means [`CommonOpts::default`]
    pub opts: Option<CommonOpts>,
}

impl RequestData {
    /// Payload with the given properties and default options
    pub fn with_props(props: Vec<Prop>) -> Self {
        Self {
            payment: Payment {
                id: String::new(),
                props,
            },
            opts: None,
        }
    }

    /// Serialize the `<data>` element
    pub fn to_xml(&self) -> Result<Vec<u8>> {
        let opts = self.opts.clone().unwrap_or_default();
        let mut writer = Writer::new(Cursor::new(Vec::new()));

        write_start(&mut writer, BytesStart::new("data"))?;

        let mut payment = BytesStart::new("payment");
        payment.push_attribute(("id", self.payment.id.as_str()));
        write_start(&mut writer, payment)?;
        for prop in &self.payment.props {
            let mut start = BytesStart::new("prop");
            start.push_attribute(("name", prop.name.as_str()));
            start.push_attribute(("value", prop.value.as_str()));
            write_start(&mut writer, start)?;
            write_end(&mut writer, "prop")?;
        }
        write_end(&mut writer, "payment")?;

        write_element(&mut writer, "oper", &opts.oper)?;
        write_element(&mut writer, "wait", &opts.wait.to_string())?;
        write_element(&mut writer, "test", &opts.test.to_string())?;

        write_end(&mut writer, "data")?;

        Ok(writer.into_inner().into_inner())
    }
}

/// Signed request envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Protocol version attribute
    pub version: String,
    /// Identity block
    pub merchant: MerchantSign,
    /// Payload the envelope was built from
    pub data: RequestData,
    /// Serialized `<data>` element (what the signature covers)
    data_xml: Vec<u8>,
}

impl Request {
    /// Build and sign an envelope
    pub fn new(merchant: &Merchant, mut data: RequestData) -> Result<Self> {
        if data.opts.is_none() {
            data.opts = Some(CommonOpts::default());
        }

        let data_xml = data.to_xml()?;
        let signed = tag_content(&data_xml, "data")?;
        Ok(Self {
            version: PROTOCOL_VERSION.to_string(),
            merchant: merchant.sign(signed),
            data,
            data_xml,
        })
    }

    /// Bytes covered by the signature
    pub fn signed_payload(&self) -> Result<&[u8]> {
        tag_content(&self.data_xml, "data")
    }

    /// Full request document, XML declaration included
    pub fn to_xml(&self) -> Result<Vec<u8>> {
        let mut buf = Cursor::new(Vec::new());
        buf.write_all(XML_HEADER.as_bytes())
            .map_err(|e| Error::Encode(e.to_string()))?;
        let mut writer = Writer::new(buf);

        let mut root = BytesStart::new("request");
        root.push_attribute(("version", self.version.as_str()));
        write_start(&mut writer, root)?;

        write_start(&mut writer, BytesStart::new("merchant"))?;
        write_element(&mut writer, "id", &self.merchant.id)?;
        write_element(&mut writer, "signature", &self.merchant.signature)?;
        write_end(&mut writer, "merchant")?;

        writer
            .get_mut()
            .write_all(&self.data_xml)
            .map_err(|e| Error::Encode(e.to_string()))?;

        write_end(&mut writer, "request")?;

        Ok(writer.into_inner().into_inner())
    }
}

fn write_start(writer: &mut Writer<Cursor<Vec<u8>>>, start: BytesStart<'_>) -> Result<()> {
    writer
        .write_event(Event::Start(start))
        .map_err(|e| Error::Encode(e.to_string()))
}

fn write_end(writer: &mut Writer<Cursor<Vec<u8>>>, tag: &str) -> Result<()> {
    writer
        .write_event(Event::End(BytesEnd::new(tag)))
        .map_err(|e| Error::Encode(e.to_string()))
}

fn write_element(writer: &mut Writer<Cursor<Vec<u8>>>, tag: &str, text: &str) -> Result<()> {
    write_start(writer, BytesStart::new(tag))?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(|e| Error::Encode(e.to_string()))?;
    write_end(writer, tag)
}
