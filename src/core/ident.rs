//! Call identifiers: `{caller-stem}-{function}-{YYYY-MM-DD-HH-MM-SS}`.

use crate::core::error::SylteError;
use crate::core::time::{extract_timestamp, format_timestamp};
use chrono::NaiveDateTime;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// A validated identifier naming one stored call.
///
/// Every `CallId` carries a parseable timestamp: it is either built from its
/// parts by [`CallId::new`] or checked by [`CallId::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallId {
    raw: String,
    timestamp: NaiveDateTime,
}

impl CallId {
    /// Build the identifier for a call of `function` made from the file `caller` at `at`.
    ///
    /// Only the file stem of `caller` is used, and only the last `::` segment of
    /// `function`.
    pub fn new(caller: &str, function: &str, at: NaiveDateTime) -> Result<Self, SylteError> {
        let stem = caller_stem(caller)?;
        let function = function_segment(function)?;
        Ok(Self {
            raw: format!("{}-{}-{}", stem, function, format_timestamp(&at)),
            timestamp: at,
        })
    }

    pub fn parse(raw: &str) -> Result<Self, SylteError> {
        let timestamp = extract_timestamp(raw)?;
        Ok(Self {
            raw: raw.to_string(),
            timestamp,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub fn contains(&self, substring: &str) -> bool {
        self.raw.contains(substring)
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl AsRef<str> for CallId {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

impl FromStr for CallId {
    type Err = SylteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Return whichever identifier carries the later timestamp. Ties go to `b`.
pub fn later_of<'a>(a: &'a CallId, b: &'a CallId) -> &'a CallId {
    if a.timestamp > b.timestamp { a } else { b }
}

/// File stem of the invoking source file, e.g. `tests/capture.rs` -> `capture`.
pub fn caller_stem(caller: &str) -> Result<String, SylteError> {
    let stem = Path::new(caller.trim())
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    check_part("caller", caller, &stem)?;
    Ok(stem)
}

/// Last path segment of a function name. `stringify!` may leave spaces around `::`.
pub fn function_segment(function: &str) -> Result<String, SylteError> {
    let segment = function.rsplit("::").next().unwrap_or_default().trim().to_string();
    check_part("function", function, &segment)?;
    Ok(segment)
}

fn check_part(kind: &str, original: &str, part: &str) -> Result<(), SylteError> {
    if part.is_empty() {
        return Err(SylteError::ValidationError(format!(
            "empty {} name derived from '{}'",
            kind, original
        )));
    }
    if part.contains(['/', '\\']) || part.chars().any(char::is_whitespace) {
        return Err(SylteError::ValidationError(format!(
            "{} name '{}' may not contain separators or whitespace",
            kind, part
        )));
    }
    Ok(())
}
