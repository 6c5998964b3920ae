//! Response envelope validation and decoding
//!
//! A reply goes through three checks, in order, before its payload is
//! trusted:
//!
//! 1. business error: the provider reports errors in-band, often without a
//!    valid signature block, so its message is surfaced first;
//! 2. structure: `<response>` with a single `<data>` holding `<info>`;
//! 3. signature: the raw content of that same `<data>` element, located
//!    by the reader rather than by text search, verified against the merchant.
//!
//! Only then is it decoded into [`Response<I>`], where `I` is the payload
//! shape chosen by the caller.

use crate::{
    error::MalformedEnvelope, signer::Merchant, signer::MerchantSign, Error, Result,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Decoded reply envelope with payload type `I`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Response<I> {
    /// Protocol version attribute
    #[serde(rename = "@version", default)]
    pub version: String,
    /// Identity block
    #[serde(default)]
    pub merchant: MerchantSign,
    /// Operation metadata and payload
    pub data: ResponseData<I>,
}

/// `<data>` section of a reply
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResponseData<I> {
    /// Operation code echoed back
    #[serde(default)]
    pub oper: String,
    /// Operation-specific payload
    pub info: I,
}

/// Raw reply body, not yet trusted
#[derive(Debug, Clone, Copy)]
pub struct RawResponse<'a>(pub &'a [u8]);

impl<'a> RawResponse<'a> {
    /// Run all checks in order
    pub fn validate(&self, merchant: &Merchant) -> Result<()> {
        let outline = Outline::scan(self.0);
        outline.business_error()?;
        outline.structure()?;
        outline.signature(self.0, merchant)
    }

    /// Fails with [`Error::Business`] if the reply is an in-band error report
    pub fn check_business_error(&self) -> Result<()> {
        Outline::scan(self.0).business_error()
    }

    /// Fails with [`Error::MalformedEnvelope`] unless the reply has the envelope shape
    pub fn check_structure(&self) -> Result<()> {
        Outline::scan(self.0).structure()
    }

    /// Fails with [`Error::InvalidSignature`] unless the identity block signs
    /// the raw content of the `response/data` element
    pub fn verify_signature(&self, merchant: &Merchant) -> Result<()> {
        Outline::scan(self.0).signature(self.0, merchant)
    }

    /// Decode into the caller's payload type
    pub fn decode<I: DeserializeOwned>(&self) -> Result<Response<I>> {
        let text = std::str::from_utf8(self.0).map_err(|e| Error::Decode(e.to_string()))?;
        quick_xml::de::from_str(text).map_err(|e| Error::Decode(e.to_string()))
    }
}

/// What the checks need to know about a reply, gathered in one pass
#[derive(Debug, Default)]
struct Outline {
    /// Reader error or truncation
    failure: Option<String>,
    root: Option<Vec<u8>>,
    /// Text directly under the root element
    root_text: String,
    /// `message` of `response/data/error`
    data_error: Option<String>,
    /// Number of `response/data` elements
    data_count: usize,
    /// Byte range of the first `response/data` content
    data_span: Option<(usize, usize)>,
    has_info: bool,
    info_has_children: bool,
    /// Text directly under `response/data/info`
    info_text: String,
    merchant: Option<MerchantSign>,
}

const DATA: &[&[u8]] = &[b"response", b"data"];
const INFO: &[&[u8]] = &[b"response", b"data", b"info"];
const MERCHANT: &[&[u8]] = &[b"response", b"merchant"];
const DATA_ERROR: &[&[u8]] = &[b"response", b"data", b"error"];

impl Outline {
    fn scan(buf: &[u8]) -> Self {
        let mut outline = Outline::default();
        if let Err(failure) = outline.walk(buf) {
            outline.failure = Some(failure);
        }
        outline
    }

    fn business_error(&self) -> Result<()> {
        if self.failure.is_some() {
            return Ok(());
        }

        match self.root.as_deref() {
            Some(b"error") => return Err(Error::Business(self.root_text.clone())),
            Some(b"response") => {}
            _ => return Ok(()),
        }

        if let Some(message) = &self.data_error {
            return Err(Error::Business(message.clone()));
        }

        if self.has_info && !self.info_has_children && !self.info_text.trim().is_empty() {
            return Err(Error::Business(self.info_text.clone()));
        }

        Ok(())
    }

    fn structure(&self) -> Result<()> {
        if let Some(failure) = &self.failure {
            return Err(Error::MalformedEnvelope(MalformedEnvelope::Unparsable(
                failure.clone(),
            )));
        }

        let missing = |what: &str| {
            Err(Error::MalformedEnvelope(MalformedEnvelope::MissingPayload(
                what.to_string(),
            )))
        };
        if self.root.as_deref() != Some(b"response".as_slice()) {
            return missing("response root element");
        }
        match self.data_count {
            0 => return missing("data"),
            1 => {}
            _ => {
                return Err(Error::MalformedEnvelope(MalformedEnvelope::Duplicate(
                    "data".to_string(),
                )))
            }
        }
        if !self.has_info {
            return missing("info");
        }
        Ok(())
    }

    fn signature(&self, buf: &[u8], merchant: &Merchant) -> Result<()> {
        let claimed = self.merchant.as_ref().ok_or(Error::InvalidSignature)?;
        if self.data_count != 1 {
            return Err(Error::InvalidSignature);
        }
        let (start, end) = self.data_span.ok_or(Error::InvalidSignature)?;
        let payload = buf.get(start..end).ok_or(Error::InvalidSignature)?;
        merchant.verify(payload, claimed)
    }

    fn walk(&mut self, buf: &[u8]) -> std::result::Result<(), String> {
        let mut reader = Reader::from_reader(buf);
        let mut path: Vec<Vec<u8>> = Vec::new();
        let mut data_start = None;

        loop {
            match reader.read_event().map_err(|e| e.to_string())? {
                Event::Start(e) => {
                    self.open(&path, &e)?;
                    path.push(e.name().as_ref().to_vec());
                    if is_path(&path, DATA) {
                        data_start = Some(reader.buffer_position() as usize);
                    }
                }
                Event::Empty(e) => {
                    self.open(&path, &e)?;
                    if parent_is(&path, b"response") && e.name().as_ref() == b"data" {
                        let at = reader.buffer_position() as usize;
                        self.data_span.get_or_insert((at, at));
                    }
                }
                Event::End(_) => {
                    if is_path(&path, DATA) {
                        if let Some(start) = data_start.take() {
                            // back up over `</data>`
                            let after = reader.buffer_position() as usize;
                            let end = buf
                                .get(start..after)
                                .and_then(|content| content.windows(2).rposition(|w| w == b"</"))
                                .map(|at| start + at)
                                .ok_or_else(|| "unbalanced data element".to_string())?;
                            self.data_span.get_or_insert((start, end));
                        }
                    }
                    path.pop();
                }
                Event::Text(t) => {
                    let text = t.unescape().map_err(|e| e.to_string())?;
                    self.text(&path, &text);
                }
                Event::CData(t) => {
                    let text = String::from_utf8_lossy(&t).into_owned();
                    self.text(&path, &text);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !path.is_empty() {
            return Err("unexpected EOF".to_string());
        }
        if self.root.is_none() {
            return Err("no root element".to_string());
        }
        Ok(())
    }

    fn open(&mut self, parent: &[Vec<u8>], e: &BytesStart<'_>) -> std::result::Result<(), String> {
        let name = e.name().as_ref().to_vec();

        if parent.is_empty() {
            if self.root.is_some() {
                return Err("multiple root elements".to_string());
            }
            self.root = Some(name.clone());
        }

        let mut path: Vec<&[u8]> = parent.iter().map(Vec::as_slice).collect();
        path.push(&name);

        if path == DATA {
            self.data_count += 1;
        } else if path == INFO {
            self.has_info = true;
        } else if path == MERCHANT {
            self.merchant.get_or_insert_with(MerchantSign::default);
        } else if path.starts_with(INFO) {
            self.info_has_children = true;
        } else if path == DATA_ERROR {
            let message = e
                .try_get_attribute("message")
                .map_err(|e| e.to_string())?
                .map(|attr| attr.unescape_value().map(|v| v.into_owned()))
                .transpose()
                .map_err(|e| e.to_string())?;
            self.data_error = Some(message.unwrap_or_default());
        }
        Ok(())
    }

    fn text(&mut self, path: &[Vec<u8>], text: &str) {
        let path: Vec<&[u8]> = path.iter().map(Vec::as_slice).collect();
        if path.len() == 1 {
            self.root_text.push_str(text);
        } else if path == INFO {
            self.info_text.push_str(text);
        } else if path.len() == 3 && path.starts_with(MERCHANT) {
            if let Some(merchant) = self.merchant.as_mut() {
                match path[2] {
                    b"id" => merchant.id.push_str(text),
                    b"signature" => merchant.signature.push_str(text),
                    _ => {}
                }
            }
        }
    }
}

fn is_path(path: &[Vec<u8>], expected: &[&[u8]]) -> bool {
    path.len() == expected.len() && path.iter().zip(expected).all(|(a, b)| a.as_slice() == *b)
}

fn parent_is(path: &[Vec<u8>], name: &[u8]) -> bool {
    path.len() == 1 && path[0].as_slice() == name
}
