//! Bank-local time zone
//!
//! Dates in API replies carry no offset; they are wall-clock times in
//! Europe/Kyiv. The zone data is compiled in (chrono-tz), so there is no
//! runtime loading and nothing to mutate.

use crate::{Error, Result};
use chrono::{DateTime, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

/// Europe/Kyiv
pub fn kyiv() -> Tz {
    chrono_tz::Europe::Kyiv
}

/// Parse a wall-clock timestamp in Europe/Kyiv
pub(crate) fn parse_local(text: &str, format: &str) -> Result<DateTime<Tz>> {
    let naive = NaiveDateTime::parse_from_str(text, format)
        .map_err(|e| Error::Decode(format!("parsing time {:?}: {}", text, e)))?;
    kyiv()
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| Error::Decode(format!("parsing time {:?}: not a valid local time", text)))
}
