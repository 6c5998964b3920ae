//! Fixed-point money codec
//!
//! Amounts travel over the wire as decimal text with at most two fractional
//! digits ("21", "0.01", "-100.90"). Internally they are exact integer counts
//! of minor units (kopecks, cents).

use crate::{Error, Result};
use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Minor units per major unit
const MINOR_PER_MAJOR: u64 = 100;

/// Integer amount of minor currency units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(pub i64);

impl Amount {
    /// Zero amount
    pub const ZERO: Amount = Amount(0);

    /// Create from minor units
    pub const fn from_minor(minor: i64) -> Self {
        Amount(minor)
    }

    /// Minor units
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Exact decimal value in major units (scale 2)
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }
}

impl From<i64> for Amount {
    fn from(minor: i64) -> Self {
        Amount(minor)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let (whole, cents) = (abs / MINOR_PER_MAJOR, abs % MINOR_PER_MAJOR);
        if cents == 0 {
            write!(f, "{}{}", sign, whole)
        } else {
            write!(f, "{}{}.{:02}", sign, whole, cents)
        }
    }
}

impl FromStr for Amount {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::Parse(format!("amount {:?}: {}", s, reason));

        let (negative, unsigned) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (whole, frac) = match unsigned.split_once('.') {
            Some((whole, frac)) => (whole, Some(frac)),
            None => (unsigned, None),
        };

        let whole = parse_digits(whole).ok_or_else(|| invalid("invalid integer part"))?;
        let cents = match frac {
            None => 0,
            Some(frac) => {
                if frac.len() > 2 {
                    return Err(invalid("more than two fractional digits"));
                }
                let digits = parse_digits(frac).ok_or_else(|| invalid("invalid fractional part"))?;
                // "5.5" means fifty cents
                if frac.len() == 1 {
                    digits * 10
                } else {
                    digits
                }
            }
        };

        let magnitude = whole
            .checked_mul(MINOR_PER_MAJOR)
            .and_then(|m| m.checked_add(cents))
            .ok_or_else(|| invalid("out of range"))?;

        let value = if negative {
            0i64.checked_sub_unsigned(magnitude)
        } else {
            i64::try_from(magnitude).ok()
        };
        value.map(Amount).ok_or_else(|| invalid("out of range"))
    }
}

/// Non-empty run of ASCII digits
fn parse_digits(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.trim().parse().map_err(de::Error::custom)
    }
}

/// Amount tagged with a currency code, e.g. "100.90 UAH"
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Funds {
    /// Currency code (may be empty)
    pub currency: String,
    /// Amount in minor units
    pub amount: Amount,
}

impl Funds {
    /// Create funds
    pub fn new(currency: impl Into<String>, amount: impl Into<Amount>) -> Self {
        Self {
            currency: currency.into(),
            amount: amount.into(),
        }
    }
}

impl fmt::Display for Funds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

impl FromStr for Funds {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (amount, currency) = s
            .split_once(' ')
            .ok_or_else(|| Error::Parse(format!("funds {:?}: missing currency separator", s)))?;
        Ok(Funds {
            currency: currency.to_string(),
            amount: amount.parse()?,
        })
    }
}

impl Serialize for Funds {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Funds {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}
