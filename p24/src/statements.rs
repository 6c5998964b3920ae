//! Card statements endpoint
//!
//! See <https://api.privatbank.ua/#p24/orders>.

use crate::{
    card::check_card_number,
    money::{Amount, Funds},
    request::{CommonOpts, Payment, Prop, RequestData},
    response::Response,
    timezone, Client, Error, Result,
};
use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use reqwest::Method;
use serde::{Deserialize, Serialize};

/// Request date layout ("01.01.2021")
const REQUEST_DATE_FORMAT: &str = "%d.%m.%Y";

/// Reply `trandate trantime` layout
const TRANSACTION_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Longest date range the API serves
pub const MAX_RANGE_DAYS: i64 = 90;

/// Options of a statements request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementsOpts {
    /// First day (inclusive)
    pub start_date: NaiveDate,
    /// Last day (inclusive)
    pub end_date: NaiveDate,
    /// Card number (16 digits)
    pub card_number: String,
    /// Common options; `None` means defaults
    pub opts: Option<CommonOpts>,
}

impl StatementsOpts {
    /// Validate date range and card number
    pub fn validate(&self) -> Result<()> {
        if self.start_date > self.end_date {
            return Err(Error::InvalidOptions(
                "date range should be with start date <= end date".to_string(),
            ));
        }
        if (self.end_date - self.start_date).num_days() > MAX_RANGE_DAYS {
            return Err(Error::InvalidOptions(format!(
                "date range should be no longer than {} days",
                MAX_RANGE_DAYS
            )));
        }
        check_card_number(&self.card_number)
    }

    fn to_request_data(&self) -> RequestData {
        RequestData {
            payment: Payment {
                id: String::new(),
                props: vec![
                    Prop::new("sd", self.start_date.format(REQUEST_DATE_FORMAT).to_string()),
                    Prop::new("ed", self.end_date.format(REQUEST_DATE_FORMAT).to_string()),
                    Prop::new("card", &self.card_number),
                ],
            },
            opts: self.opts.clone(),
        }
    }
}

/// Statement list of a card
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statements {
    /// Reply status
    #[serde(rename(deserialize = "@status"), default)]
    pub status: String,
    /// Total credit
    #[serde(rename(deserialize = "@credit"), default)]
    pub credit: Amount,
    /// Total debit
    #[serde(rename(deserialize = "@debet"), default)]
    pub debet: Amount,
    /// Transactions
    #[serde(rename(deserialize = "statement"), default)]
    pub statements: Vec<Statement>,
}

/// One card transaction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Statement {
    /// Card number
    #[serde(rename(deserialize = "@card"))]
    pub card: String,
    /// Authorization code
    #[serde(rename(deserialize = "@appcode"))]
    pub appcode: String,
    /// Transaction date, "2006-01-02"
    #[serde(rename(deserialize = "@trandate"))]
    pub tran_date: String,
    /// Transaction time, "15:04:05"
    #[serde(rename(deserialize = "@trantime"))]
    pub tran_time: String,
    /// Terminal
    #[serde(rename(deserialize = "@terminal"))]
    pub terminal: String,
    /// Description
    #[serde(rename(deserialize = "@description"))]
    pub description: String,
    /// Transaction amount
    #[serde(rename(deserialize = "@amount"))]
    pub amount: Funds,
    /// Amount in card currency
    #[serde(rename(deserialize = "@cardamount"))]
    pub card_amount: Funds,
    /// Card balance after the transaction
    #[serde(rename(deserialize = "@rest"))]
    pub rest: Funds,
}

impl Statement {
    /// Transaction timestamp (Europe/Kyiv)
    pub fn tran_date_time(&self) -> Result<DateTime<Tz>> {
        let text = format!("{} {}", self.tran_date, self.tran_time);
        timezone::parse_local(&text, TRANSACTION_TIME_FORMAT)
    }
}

/// `<info>` payload of a statements reply
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatementsInfo {
    /// Statement list
    pub statements: Statements,
}

impl Client {
    /// Card transactions for a date range
    pub async fn statements(&self, opts: &StatementsOpts) -> Result<Statements> {
        opts.validate()?;

        let response: Response<StatementsInfo> = self
            .call(&self.endpoints.statements, Method::POST, opts.to_request_data())
            .await?;
        Ok(response.data.info.statements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CannedTransport;
    use crate::{ErrorKind, Merchant, XML_HEADER};

    const STATEMENTS_REPLY: &str = r#"<?xml version="1.0" encoding="UTF-8"?><response version="1.0"><merchant><id>id</id><signature>68ca17bc2ca05d70ec51611dfd6a84cf1fcc388f</signature></merchant><data><oper>cmt</oper><info><statements status="excellent" credit="0.0" debet="5.5"><statement card="1234567890123456" appcode="12345" trandate="2021-01-01" trantime="05:05:05" amount="5.50 UAH" cardamount="-5.50 UAH" rest="10 UAH" terminal="PrivatBank, 123" description="test"/></statements></info></data></response>"#;

    const TAMPERED_REPLY: &str = r#"<?xml version="1.0" encoding="UTF-8"?><response version="1.0"><merchant><id>id</id><signature>61ca17bc2ca05d70ec51611dfd6a84cf1fcc388f</signature></merchant><data><oper>cmt</oper><info><statements status="excellent" credit="0.0" debet="5.5"><statement card="1234567890123456" appcode="12345" trandate="2021-01-01" trantime="05:05:05" amount="5.50 UAH" cardamount="-5.50 UAH" rest="10 UAH" terminal="PrivatBank, 123" description="test"/></statements></info></data></response>"#;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn opts(start: NaiveDate, end: NaiveDate, card: &str) -> StatementsOpts {
        StatementsOpts {
            start_date: start,
            end_date: end,
            card_number: card.to_string(),
            opts: None,
        }
    }

    #[test]
    fn test_statements_opts_validate() {
        let cases = [
            (
                opts(date(2000, 1, 1), date(2001, 1, 1), "1111111111111111"),
                Some("date range should be no longer than 90 days"),
            ),
            (
                opts(date(2000, 3, 3), date(2000, 2, 1), "1111111111111111"),
                Some("date range should be with start date <= end date"),
            ),
            (
                opts(date(2000, 1, 1), date(2000, 2, 1), "not a card"),
                Some("invalid card number: should be sixteen length"),
            ),
            (opts(date(2000, 1, 1), date(2000, 3, 31), "0101011111111111"), None),
            (opts(date(2000, 1, 1), date(2000, 2, 1), "0101011111111111"), None),
        ];

        for (opts, expected) in cases {
            match (opts.validate(), expected) {
                (Ok(()), None) => {}
                (Err(err), Some(msg)) => assert!(err.to_string().contains(msg), "{}", err),
                (result, expected) => panic!("{:?}: got {:?}, want {:?}", opts, result, expected),
            }
        }
    }

    #[test]
    fn test_tran_date_time() {
        let statement = Statement {
            tran_time: "21:21:21".into(),
            tran_date: "2021-12-21".into(),
            ..Statement::default()
        };
        assert_eq!(statement.tran_date_time().unwrap().timestamp(), 1640114481);

        let empty = Statement::default();
        assert!(empty.tran_date_time().is_err());
    }

    #[tokio::test]
    async fn test_client_statements() {
        let transport = CannedTransport::new(200, STATEMENTS_REPLY);
        let client = Client::new(Merchant::new("id", "pass"), transport.clone());

        let statements = client
            .statements(&opts(date(2021, 1, 1), date(2021, 1, 2), "1234567890123456"))
            .await
            .unwrap();

        let expected_request = String::from(XML_HEADER)
            + r#"<request version="1.0"><merchant><id>id</id><signature>6295880c80459b0b50d208de152dc1000bde1708</signature></merchant><data><payment id=""><prop name="sd" value="01.01.2021"></prop><prop name="ed" value="02.01.2021"></prop><prop name="card" value="1234567890123456"></prop></payment><oper>cmt</oper><wait>0</wait><test>0</test></data></request>"#;
        assert_eq!(transport.sent_body(), expected_request);

        assert_eq!(
            statements,
            Statements {
                status: "excellent".into(),
                credit: Amount(0),
                debet: Amount(550),
                statements: vec![Statement {
                    card: "1234567890123456".into(),
                    appcode: "12345".into(),
                    tran_date: "2021-01-01".into(),
                    tran_time: "05:05:05".into(),
                    terminal: "PrivatBank, 123".into(),
                    description: "test".into(),
                    amount: Funds::new("UAH", 550),
                    card_amount: Funds::new("UAH", -550),
                    rest: Funds::new("UAH", 1000),
                }],
            }
        );
        assert_eq!(
            statements.statements[0].tran_date_time().unwrap().timestamp(),
            1609470305
        );

        let json = serde_json::to_value(&statements).unwrap();
        assert_eq!(json["debet"], "5.50");
        assert_eq!(json["statements"][0]["card_amount"], "-5.50 UAH");
    }

    #[tokio::test]
    async fn test_client_statements_invalid_signature() {
        let transport = CannedTransport::new(200, TAMPERED_REPLY);
        let client = Client::new(Merchant::new("id", "pass"), transport);

        let err = client
            .statements(&opts(date(2021, 1, 1), date(2021, 1, 2), "1234567890123456"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSignature);
    }

    #[tokio::test]
    async fn test_client_statements_invalid_opts() {
        let transport = CannedTransport::new(200, STATEMENTS_REPLY);
        let client = Client::new(Merchant::new("id", "pass"), transport.clone());

        let err = client
            .statements(&opts(date(2021, 1, 1), date(2021, 1, 1), "err"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOptions);
        assert!(transport.seen.lock().unwrap().is_empty());
    }
}
