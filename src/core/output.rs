//! Rendering helpers for CLI surfaces.

use crate::core::error::SylteError;
use crate::core::ident::CallId;
use crate::core::value::{Payload, Value};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = SylteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(SylteError::ValidationError(format!(
                "unknown format '{}': expected 'text' or 'json'",
                other
            ))),
        }
    }
}

/// One identifier per line, or a JSON array of identifiers.
pub fn render_ids(ids: &[CallId], format: OutputFormat) -> Result<String, SylteError> {
    match format {
        OutputFormat::Text => Ok(ids
            .iter()
            .map(CallId::as_str)
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Json => {
            let names: Vec<&str> = ids.iter().map(CallId::as_str).collect();
            Ok(serde_json::to_string_pretty(&names)?)
        }
    }
}

pub fn render_payload(payload: &Payload, format: OutputFormat) -> Result<String, SylteError> {
    match format {
        OutputFormat::Text => {
            let mut out = format!("args:   {}", Value::Tuple(payload.args.clone()));
            out.push_str("\nkwargs:");
            if payload.kwargs.is_empty() {
                out.push_str(" {}");
            }
            for (name, value) in &payload.kwargs {
                out.push_str(&format!("\n  {} = {}", name, value));
            }
            Ok(out)
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(payload)?),
    }
}
