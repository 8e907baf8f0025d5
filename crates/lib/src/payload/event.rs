//! Inbound event: a schemaless JSON object with placeholder-aware accessors.

use serde_json::{Map, Value};

/// Placeholder rendered for any field that is absent or fails to coerce.
pub const PLACEHOLDER: &str = "N/A";

/// One normalized webhook payload. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InboundEvent {
    fields: Map<String, Value>,
}

impl InboundEvent {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Non-empty string value for `key`. Numbers and mappings are not coerced.
    pub fn non_empty_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(non_empty_str)
    }

    /// Display label for `key`: strings verbatim, numbers in JSON form, otherwise `N/A`.
    pub fn label(&self, key: &str) -> String {
        label(self.get(key))
    }

    /// Price-formatted value for `key` (see [`crate::format::fmt_price`]).
    pub fn price(&self, key: &str) -> String {
        crate::format::fmt_price(self.get(key))
    }

    /// Event time: `time` when it is a preformatted string or epoch millis, else `time_ms`.
    pub fn time(&self) -> String {
        let time = crate::format::fmt_time(self.get("time"));
        if time == PLACEHOLDER {
            crate::format::fmt_time_ms(self.get("time_ms"))
        } else {
            time
        }
    }

    /// Nested mapping for `key`. Anything that is not an object reads as empty.
    pub fn section(&self, key: &str) -> InboundEvent {
        match self.get(key) {
            Some(Value::Object(map)) => InboundEvent::new(map.clone()),
            _ => InboundEvent::default(),
        }
    }

    /// Trimmed `secret` field; absent or non-string reads as "".
    pub fn secret(&self) -> &str {
        self.get("secret")
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or("")
    }
}

impl From<Map<String, Value>> for InboundEvent {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.trim().is_empty())
}

fn label(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}
