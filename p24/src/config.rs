//! Client configuration

use crate::{client::Endpoints, signer::Merchant, Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Environment variable prefix (`P24_MERCHANT_ID`, `P24_TIMEOUT_SECONDS`, ...)
pub const ENV_PREFIX: &str = "P24";

/// Client configuration
#[derive(Clone, Deserialize)]
pub struct ClientConfig {
    /// Merchant ID
    pub merchant_id: String,

    /// Merchant password
    pub merchant_password: String,

    /// Card balance endpoint
    #[serde(default = "default_balance_url")]
    pub balance_url: String,

    /// Card statements endpoint
    #[serde(default = "default_statements_url")]
    pub statements_url: String,

    /// HTTP timeout (seconds)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_balance_url() -> String {
    crate::client::BALANCE_URL.to_string()
}

fn default_statements_url() -> String {
    crate::client::STATEMENTS_URL.to_string()
}

fn default_timeout_seconds() -> u64 {
    crate::DEFAULT_REQUEST_TIMEOUT_SECONDS
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("merchant_id", &self.merchant_id)
            .field("merchant_password", &"<redacted>")
            .field("balance_url", &self.balance_url)
            .field("statements_url", &self.statements_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl ClientConfig {
    /// Config with credentials and default endpoints
    pub fn new(merchant_id: impl Into<String>, merchant_password: impl Into<String>) -> Self {
        Self {
            merchant_id: merchant_id.into(),
            merchant_password: merchant_password.into(),
            balance_url: default_balance_url(),
            statements_url: default_statements_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }

    /// Load from an optional TOML file, overridden by `P24_*` environment variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let config: ClientConfig = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: ClientConfig = config::Config::builder()
            .add_source(config::File::from_str(content, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Check required values
    pub fn validate(&self) -> Result<()> {
        if self.merchant_id.is_empty() {
            return Err(Error::Config("merchant_id is required".to_string()));
        }
        if self.merchant_password.is_empty() {
            return Err(Error::Config("merchant_password is required".to_string()));
        }
        if self.timeout_seconds == 0 {
            return Err(Error::Config("timeout_seconds must be positive".to_string()));
        }
        Ok(())
    }

    /// Merchant identity
    pub fn merchant(&self) -> Merchant {
        Merchant::new(&self.merchant_id, &self.merchant_password)
    }

    /// Endpoint URLs
    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            balance: self.balance_url.clone(),
            statements: self.statements_url.clone(),
        }
    }
}
