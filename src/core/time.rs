//! Timestamp helpers for call identifiers.
//!
//! Every identifier ends in a second-resolution local timestamp formatted as
//! `YYYY-MM-DD-HH-MM-SS`. Ordering of stored entries is always decided by the
//! parsed timestamp, never by the file name.

use crate::core::error::SylteError;
use chrono::{Local, NaiveDateTime, SubsecRound};
use regex::Regex;
use std::sync::LazyLock;

/// `strftime` layout of the embedded timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Trailing timestamp of an identifier.
static TIMESTAMP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4}-\d{2}-\d{2}-\d{2}-\d{2}-\d{2})$").expect("timestamp pattern is valid")
});

/// Current local time truncated to whole seconds.
pub fn now_local() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(0)
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Extract and parse the timestamp embedded at the end of `name`.
///
/// The pattern is anchored to the end of the name: a timestamp followed by
/// anything else (`x-2022-01-01-00-00-00.bak`) does not count, and such a name
/// is a [`SylteError::MalformedIdentifier`].
pub fn extract_timestamp(name: &str) -> Result<NaiveDateTime, SylteError> {
    let raw = TIMESTAMP_PATTERN
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| SylteError::MalformedIdentifier(name.to_string()))?;
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map_err(|_| SylteError::MalformedIdentifier(name.to_string()))
}
