//! Card balance endpoint
//!
//! See <https://api.privatbank.ua/#p24/balance>.

use crate::{
    card::check_card_number,
    money::Amount,
    request::{CommonOpts, Payment, Prop, RequestData},
    response::Response,
    timezone, Client, Result,
};
use chrono::DateTime;
use chrono_tz::Tz;
use reqwest::Method;
use serde::{Deserialize, Deserializer, Serialize};

/// Layout of `bal_date` ("02.09.13 21:34")
const BALANCE_DATE_FORMAT: &str = "%d.%m.%y %H:%M";

/// Options of a balance request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceOpts {
    /// Card number (16 digits)
    pub card_number: String,
    /// Country code, e.g. "UA"
    pub country: String,
    /// Common options; `None` means defaults
    pub opts: Option<CommonOpts>,
}

impl BalanceOpts {
    /// Validate before sending
    pub fn validate(&self) -> Result<()> {
        check_card_number(&self.card_number)
    }

    fn to_request_data(&self) -> RequestData {
        RequestData {
            payment: Payment {
                id: String::new(),
                props: vec![
                    Prop::new("cardnum", &self.card_number),
                    Prop::new("country", &self.country),
                ],
            },
            opts: self.opts.clone(),
        }
    }
}

/// Card details of a balance reply
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Card {
    /// Account
    pub account: String,
    /// Card number
    #[serde(rename = "card_number")]
    pub number: String,
    /// Account name
    pub acc_name: String,
    /// Account type
    pub acc_type: String,
    /// Currency code
    pub currency: String,
    /// Card type
    pub card_type: String,
    /// Main card number
    #[serde(rename = "main_card_number")]
    pub main_card: String,
    /// Card status
    #[serde(rename = "card_stat")]
    pub status: String,
    /// Source
    pub src: String,
}

/// Balance of a card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardBalance {
    /// Balance date (Europe/Kyiv)
    #[serde(rename = "bal_date", deserialize_with = "deserialize_balance_date")]
    pub date: DateTime<Tz>,
    /// Balance dynamics flag
    #[serde(rename = "bal_dyn", default)]
    pub dyn_flag: String,
    /// Card
    #[serde(default)]
    pub card: Card,
    /// Available funds
    #[serde(rename = "av_balance")]
    pub available: Amount,
    /// Balance
    pub balance: Amount,
    /// Financial limit
    pub fin_limit: Amount,
    /// Trade limit
    pub trade_limit: Amount,
}

/// `<info>` payload of a balance reply
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BalanceInfo {
    /// Balance record
    pub cardbalance: CardBalance,
}

fn deserialize_balance_date<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<DateTime<Tz>, D::Error> {
    let text = String::deserialize(deserializer)?;
    timezone::parse_local(text.trim(), BALANCE_DATE_FORMAT).map_err(serde::de::Error::custom)
}

impl Client {
    /// Current balance of a merchant card
    pub async fn card_balance(&self, opts: &BalanceOpts) -> Result<CardBalance> {
        opts.validate()?;

        let response: Response<BalanceInfo> = self
            .call(&self.endpoints.balance, Method::POST, opts.to_request_data())
            .await?;
        Ok(response.data.info.cardbalance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CannedTransport;
    use crate::{Error, ErrorKind, Merchant, XML_HEADER};
    use chrono::TimeZone;

    const BALANCE_REPLY: &str = r#"<?xml version="1.0" encoding="UTF-8"?><response version="1.0"><merchant><id>id</id><signature>13dccaec0c5303ae43217901d9a61cb94a132c19</signature></merchant><data><oper>cmt</oper><info><cardbalance><bal_date>01.01.21 01:01</bal_date><bal_dyn></bal_dyn><card><account></account><card_number>1234567890123456</card_number><acc_name></acc_name><acc_type></acc_type><currency></currency><card_type></card_type><main_card_number>1234567890123456</main_card_number><card_stat></card_stat><src></src></card><av_balance>0.01</av_balance><balance>0</balance><fin_limit>0</fin_limit><trade_limit>0.02</trade_limit></cardbalance></info></data></response>"#;

    fn opts(card: &str) -> BalanceOpts {
        BalanceOpts {
            card_number: card.to_string(),
            country: "USA".to_string(),
            opts: None,
        }
    }

    #[test]
    fn test_card_balance_deserialize() {
        let xml = r#"<cardbalance><bal_date>02.09.13 21:34</bal_date><bal_dyn>dyn</bal_dyn><card><account>acc</account><card_number>num</card_number><acc_name>name</acc_name><acc_type>acctype</acc_type><currency>UAH</currency><card_type>type</card_type><main_card_number>main</main_card_number><card_stat>Status</card_stat><src>src</src></card><av_balance>1.23</av_balance><balance>3.21</balance><fin_limit>0.10</fin_limit><trade_limit>0.01</trade_limit></cardbalance>"#;

        let balance: CardBalance = quick_xml::de::from_str(xml).unwrap();
        assert_eq!(
            balance,
            CardBalance {
                date: timezone::kyiv()
                    .with_ymd_and_hms(2013, 9, 2, 21, 34, 0)
                    .single()
                    .unwrap(),
                dyn_flag: "dyn".into(),
                card: Card {
                    account: "acc".into(),
                    number: "num".into(),
                    acc_name: "name".into(),
                    acc_type: "acctype".into(),
                    currency: "UAH".into(),
                    card_type: "type".into(),
                    main_card: "main".into(),
                    status: "Status".into(),
                    src: "src".into(),
                },
                available: Amount(123),
                balance: Amount(321),
                fin_limit: Amount(10),
                trade_limit: Amount(1),
            }
        );
    }

    #[test]
    fn test_card_balance_deserialize_errors() {
        let truncated = r#"<cardbalance><bal_date>02.09.13 21:34</bal_date><bal_dyn>dyn</bal_dyn><card><acc"#;
        assert!(quick_xml::de::from_str::<CardBalance>(truncated).is_err());

        let bad_date = r#"<cardbalance><bal_date>02-09-13 21:34</bal_date></cardbalance>"#;
        let err = quick_xml::de::from_str::<CardBalance>(bad_date).unwrap_err();
        assert!(err.to_string().contains("parsing time"));
    }

    #[tokio::test]
    async fn test_client_card_balance() {
        let transport = CannedTransport::new(200, BALANCE_REPLY);
        let client = Client::new(Merchant::new("id", "pass"), transport.clone());

        let balance = client.card_balance(&opts("1234567890123456")).await.unwrap();

        let expected_request = String::from(XML_HEADER)
            + r#"<request version="1.0"><merchant><id>id</id><signature>7a0d071af8d0ebf513bb30ab74e1fd5f172abe82</signature></merchant><data><payment id=""><prop name="cardnum" value="1234567890123456"></prop><prop name="country" value="USA"></prop></payment><oper>cmt</oper><wait>0</wait><test>0</test></data></request>"#;
        assert_eq!(transport.sent_body(), expected_request);
        assert_eq!(transport.seen.lock().unwrap()[0].url, crate::client::BALANCE_URL);

        assert_eq!(
            balance,
            CardBalance {
                date: timezone::kyiv()
                    .with_ymd_and_hms(2021, 1, 1, 1, 1, 0)
                    .single()
                    .unwrap(),
                dyn_flag: String::new(),
                card: Card {
                    number: "1234567890123456".into(),
                    main_card: "1234567890123456".into(),
                    ..Card::default()
                },
                available: Amount(1),
                balance: Amount(0),
                fin_limit: Amount(0),
                trade_limit: Amount(2),
            }
        );
    }

    #[tokio::test]
    async fn test_client_card_balance_invalid_card() {
        let transport = CannedTransport::new(200, BALANCE_REPLY);
        let client = Client::new(Merchant::new("id", "pass"), transport.clone());

        let err = client.card_balance(&opts("sdalkfj")).await.unwrap_err();
        assert!(matches!(err, Error::InvalidOptions(_)));
        assert!(err.to_string().contains("invalid card number"));
        assert!(transport.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_client_card_balance_bad_status() {
        let transport = CannedTransport::new(400, BALANCE_REPLY);
        let client = Client::new(Merchant::new("id", "pass"), transport);

        let err = client
            .card_balance(&opts("1234567890123456"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedStatus);
        assert!(err.to_string().contains("unexpected http status code 400"));
    }
}
