//! Inbound payloads: tolerant body parsing and the schemaless event type.

mod event;
mod parser;

pub use event::{InboundEvent, PLACEHOLDER};
pub use parser::{is_json_content_type, parse_body, ParsedBody};
