//! # P24 Merchant Client
//!
//! Client for the Privat24 merchant XML API:
//! - Signed request envelopes (`sha1(md5(data + password))`)
//! - Reply validation (business error, structure, signature)
//! - Card balance and card statements endpoints
//! - Pluggable HTTP transport (`reqwest` by default)
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │   Endpoints: card_balance() / statements()       │
//! └────────────┬─────────────────────────────────────┘
//!              │ RequestData
//! ┌────────────▼─────────────────────────────────────┐
//! │   Client: sign ─▶ transport ─▶ validate ─▶ decode│
//! └───┬────────────────┬─────────────────────┬───────┘
//!     │                │                     │
//! ┌───▼─────┐   ┌──────▼──────┐   ┌──────────▼───────┐
//! │ Request │   │  Transport  │   │   RawResponse    │
//! │ Signer  │   │  (reqwest)  │   │ extract + Outline│
//! └─────────┘   └─────────────┘   └──────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod balance;
pub mod card;
pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod metrics;
pub mod money;
pub mod request;
pub mod response;
pub mod signer;
pub mod statements;
pub mod timezone;
pub mod transport;

#[cfg(test)]
mod testing;

pub use balance::{BalanceOpts, Card, CardBalance};
pub use card::check_card_number;
pub use client::{Client, Endpoints};
pub use config::ClientConfig;
pub use error::{CallError, Error, ErrorKind, MalformedEnvelope, Result};
pub use extract::tag_content;
pub use money::{Amount, Funds};
pub use request::{CommonOpts, Payment, Prop, Request, RequestData, XML_HEADER};
pub use response::{RawResponse, Response, ResponseData};
pub use signer::{Merchant, MerchantSign};
pub use statements::{Statement, Statements, StatementsOpts};
pub use timezone::kyiv;
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};

/// Default request timeout (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;
