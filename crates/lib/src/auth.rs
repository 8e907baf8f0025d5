//! Shared-secret check for inbound alerts.
//!
//! The check is opt-in: with no expected secret configured every payload is
//! accepted. Once a secret is configured, only structured payloads carrying an
//! exactly matching `secret` field pass.

use crate::payload::{InboundEvent, ParsedBody};

/// Authorize a parsed body against the expected secret.
pub fn authorize(body: &ParsedBody, expected: Option<&str>) -> bool {
    match body {
        ParsedBody::Structured(event) => authorize_event(event, expected),
        ParsedBody::Raw(_) | ParsedBody::Empty => secret_required(expected).is_none(),
    }
}

/// Authorize a structured event against the expected secret.
pub fn authorize_event(event: &InboundEvent, expected: Option<&str>) -> bool {
    match secret_required(expected) {
        None => true,
        Some(expected) => event.secret() == expected,
    }
}

fn secret_required(expected: Option<&str>) -> Option<&str> {
    expected.filter(|s| !s.is_empty())
}
