//! Tolerant body parsing. TradingView labels JSON bodies as `text/plain`, so
//! the declared content type is only a hint.

use super::event::InboundEvent;
use serde_json::{Map, Value};

/// Result of parsing an inbound request body.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedBody {
    /// The body was a JSON object.
    Structured(InboundEvent),
    /// The body was not a JSON object; the decoded text is kept for fallback rendering.
    Raw(String),
    /// The body was empty or whitespace only.
    Empty,
}

impl ParsedBody {
    pub fn event(&self) -> Option<&InboundEvent> {
        match self {
            ParsedBody::Structured(event) => Some(event),
            _ => None,
        }
    }

    /// Short tag for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ParsedBody::Structured(_) => "structured",
            ParsedBody::Raw(_) => "raw",
            ParsedBody::Empty => "empty",
        }
    }
}

/// True when the content type declares JSON (`application/json`, `*/*+json`).
pub fn is_json_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || mime.ends_with("+json")
}

/// Parse a request body into a [`ParsedBody`]. Never fails.
///
/// 1. When the content type declares JSON, a non-empty object is accepted as is.
/// 2. Otherwise the text is parsed as JSON regardless of content type. Any object
///    is accepted; a JSON string holding an object is unwrapped once.
/// 3. Otherwise the text is returned raw, or `Empty` when blank.
pub fn parse_body(content_type: Option<&str>, body: &[u8]) -> ParsedBody {
    if content_type.map(is_json_content_type).unwrap_or(false) {
        if let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(body) {
            if !map.is_empty() {
                return ParsedBody::Structured(map.into());
            }
        }
    }

    let text = String::from_utf8_lossy(body).into_owned();
    let trimmed = text.trim_start_matches('\u{feff}').trim();
    if trimmed.is_empty() {
        return ParsedBody::Empty;
    }
    match object_from_text(trimmed) {
        Some(map) => ParsedBody::Structured(map.into()),
        None => ParsedBody::Raw(text),
    }
}

fn object_from_text(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text).ok()? {
        Value::Object(map) => Some(map),
        Value::String(inner) => match serde_json::from_str::<Value>(inner.trim()).ok()? {
            Value::Object(map) => Some(map),
            _ => None,
        },
        _ => None,
    }
}
