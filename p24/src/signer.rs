//! Merchant identity and envelope signature
//!
//! The provider's scheme: `hex(sha1(hex(md5(payload || password))))`, where
//! `payload` is the raw content of the envelope's `<data>` element.

use crate::{Error, Result};
use md5::Md5;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::fmt;

/// Merchant credentials issued by the bank
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Merchant {
    /// Merchant ID
    pub id: String,
    /// Merchant password (never transmitted)
    pub password: String,
}

impl fmt::Debug for Merchant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Merchant")
            .field("id", &self.id)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Identity block carried by every envelope
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantSign {
    /// Merchant ID
    #[serde(default)]
    pub id: String,
    /// Lowercase hex digest
    #[serde(default)]
    pub signature: String,
}

impl Merchant {
    /// Create merchant
    pub fn new(id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            password: password.into(),
        }
    }

    /// Sign payload bytes
    pub fn sign(&self, payload: &[u8]) -> MerchantSign {
        MerchantSign {
            id: self.id.clone(),
            signature: self.digest(payload),
        }
    }

    /// Verify a claimed identity block against payload bytes
    pub fn verify(&self, payload: &[u8], claimed: &MerchantSign) -> Result<()> {
        if claimed.id != self.id || claimed.signature != self.digest(payload) {
            return Err(Error::InvalidSignature);
        }
        Ok(())
    }

    fn digest(&self, payload: &[u8]) -> String {
        let mut md5 = Md5::new();
        md5.update(payload);
        md5.update(self.password.as_bytes());
        let inner = hex::encode(md5.finalize());
        hex::encode(Sha1::digest(inner.as_bytes()))
    }
}
