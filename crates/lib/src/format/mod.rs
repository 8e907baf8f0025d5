//! Rendering inbound events into chat notifications.
//!
//! Output is always plain text: Telegram rejects messages whose Markdown does
//! not parse, and alert fields routinely contain `_`, `*` and `.`.

mod fields;
mod zones;

pub use fields::{fmt_price, fmt_time, fmt_time_ms};
pub use zones::{DeviationZone, ScheduledZonesReport, SCHEDULED_ZONES};

use crate::payload::{InboundEvent, ParsedBody, PLACEHOLDER};
use serde::Serialize;
use std::fmt;

/// Type tag used when the payload carries no `type`.
pub const DEFAULT_TYPE: &str = "UNKNOWN";

const ALERT_TITLE: &str = "🔔 TradingView Alert";

/// Telegram `parse_mode` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParseMode {
    Markdown,
    MarkdownV2,
    #[serde(rename = "HTML")]
    Html,
}

/// A notification ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    text: String,
    parse_mode: Option<ParseMode>,
}

impl RenderedMessage {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: None,
        }
    }

    pub fn with_parse_mode(text: impl Into<String>, parse_mode: ParseMode) -> Self {
        Self {
            text: text.into(),
            parse_mode: Some(parse_mode),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn parse_mode(&self) -> Option<ParseMode> {
        self.parse_mode
    }
}

impl fmt::Display for RenderedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Notification type selected by the event's `type` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationType {
    ScheduledZones,
    Generic(String),
}

impl NotificationType {
    pub fn of(event: &InboundEvent) -> Self {
        let tag = event.label("type");
        match tag.trim() {
            SCHEDULED_ZONES => NotificationType::ScheduledZones,
            PLACEHOLDER => NotificationType::Generic(DEFAULT_TYPE.to_string()),
            other => NotificationType::Generic(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            NotificationType::ScheduledZones => SCHEDULED_ZONES,
            NotificationType::Generic(tag) => tag,
        }
    }
}

/// Render a structured event. Never fails; missing fields degrade to `N/A`.
pub fn render(event: &InboundEvent) -> RenderedMessage {
    let text = match NotificationType::of(event) {
        NotificationType::ScheduledZones => ScheduledZonesReport::from_event(event).to_string(),
        NotificationType::Generic(tag) => match free_text(event) {
            Some(text) => text.to_string(),
            None => GenericReport::from_event(event, tag).to_string(),
        },
    };
    RenderedMessage::plain(text)
}

/// Render an unparseable body: the fallback title followed by the body verbatim.
pub fn render_raw(raw: &str) -> RenderedMessage {
    RenderedMessage::plain(format!("{ALERT_TITLE} ({DEFAULT_TYPE})\n{raw}"))
}

/// Render any parsed body. An empty body has nothing to render.
pub fn render_body(body: &ParsedBody) -> Option<RenderedMessage> {
    match body {
        ParsedBody::Structured(event) => Some(render(event)),
        ParsedBody::Raw(raw) => Some(render_raw(raw)),
        ParsedBody::Empty => None,
    }
}

/// `message` or `text`, whichever is a non-empty string first.
fn free_text(event: &InboundEvent) -> Option<&str> {
    event
        .non_empty_str("message")
        .or_else(|| event.non_empty_str("text"))
}

/// Field-assembled fallback for events without free text.
struct GenericReport {
    tag: String,
    symbol: String,
    timeframe: String,
    price: String,
    time: String,
}

impl GenericReport {
    fn from_event(event: &InboundEvent, tag: String) -> Self {
        Self {
            tag,
            symbol: event.label("symbol"),
            timeframe: event.label("tf"),
            price: event.price("price"),
            time: event.time(),
        }
    }
}

impl fmt::Display for GenericReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{ALERT_TITLE} ({})", self.tag)?;
        writeln!(f, "Symbol: {}", self.symbol)?;
        writeln!(f, "Timeframe: {}", self.timeframe)?;
        writeln!(f, "Price: {}", self.price)?;
        write!(f, "Time: {}", self.time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::parse_body;
    use serde_json::{json, Value};

    fn event(value: Value) -> InboundEvent {
        match value {
            Value::Object(map) => InboundEvent::new(map),
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn free_text_is_used_verbatim() {
        let msg = render(&event(json!({"type": "TV_TEST", "message": "*hello* _world_"})));
        assert_eq!(msg.text(), "*hello* _world_");
        let msg = render(&event(json!({"message": "", "text": "from text"})));
        assert_eq!(msg.text(), "from text");
    }

    #[test]
    fn missing_type_defaults_to_unknown() {
        let msg = render(&event(json!({"symbol": "BTCUSD"})));
        assert_eq!(
            msg.text(),
            "🔔 TradingView Alert (UNKNOWN)\nSymbol: BTCUSD\nTimeframe: N/A\nPrice: N/A\nTime: N/A"
        );
    }

    #[test]
    fn numeric_type_is_rendered_in_title() {
        let msg = render(&event(json!({"type": 3, "symbol": "BTC"})));
        assert!(msg.text().starts_with("🔔 TradingView Alert (3)\nSymbol: BTC"), "{}", msg.text());
    }

    #[test]
    fn generic_template_uses_all_fields() {
        let msg = render(&event(json!({
            "type": "SIGNAL",
            "symbol": "XAUUSD",
            "tf": 15,
            "price": "2650.456",
            "time_ms": 1768928880000_i64
        })));
        assert_eq!(
            msg.text(),
            "🔔 TradingView Alert (SIGNAL)\nSymbol: XAUUSD\nTimeframe: 15\nPrice: 2,650.46\nTime: 2026-01-20 17:08 UTC"
        );
    }

    #[test]
    fn empty_event_renders_non_empty_text() {
        let msg = render(&InboundEvent::default());
        assert!(msg.text().starts_with("🔔 TradingView Alert (UNKNOWN)"));
        assert!(msg.parse_mode().is_none());
    }

    #[test]
    fn rendering_is_total_for_odd_shapes() {
        for value in [
            json!({"type": 7, "symbol": null, "price": {"x": 1}}),
            json!({"type": "SCHEDULED_ZONES", "buy": [1, 2], "sell": "x", "vwap": true}),
            json!({"type": "", "message": 12, "text": {"a": "b"}}),
            json!({"time": {"ms": 1}, "time_ms": "soon"}),
        ] {
            let msg = render(&event(value.clone()));
            assert!(!msg.text().is_empty(), "input {value}");
        }
    }

    #[test]
    fn scheduled_zones_report() {
        let msg = render(&event(json!({
            "type": "SCHEDULED_ZONES",
            "symbol": "XAUUSD",
            "tf": "15",
            "slot_gmt": "09:00",
            "time": "2026-01-20 17:08 UTC",
            "vwap": 1895.123,
            "buy": {"dev2": 1900.5, "dev3": "1890", "sl": 1880, "tp": 1950.25},
            "sell": {}
        })));
        let expected = "\
📊 Scheduled VWAP Deviation Zones
Symbol: XAUUSD
Timeframe: 15
Slot (GMT): 09:00
Bar Close: 2026-01-20 17:08 UTC
VWAP: 1,895.12

🟩 BUY (Dev2–Dev5)
Dev2: 1,900.50
Dev3: 1,890.00
Dev4: N/A
Dev5: N/A
SL:   1,880.00
TP:   1,950.25

🟥 SELL (Dev2–Dev5)
Dev2: N/A
Dev3: N/A
Dev4: N/A
Dev5: N/A
SL:   N/A
TP:   N/A
";
        assert_eq!(msg.text(), expected);
    }

    #[test]
    fn scheduled_zones_falls_back_to_time_ms() {
        let report = ScheduledZonesReport::from_event(&event(json!({
            "type": "SCHEDULED_ZONES",
            "time_ms": 0
        })));
        assert_eq!(report.bar_close, "1970-01-01 00:00 UTC");
        assert_eq!(report.symbol, PLACEHOLDER);
        assert_eq!(report.sell.devs, ["N/A", "N/A", "N/A", "N/A"].map(String::from));
    }

    #[test]
    fn scheduled_zones_ignores_message_field() {
        let msg = render(&event(json!({"type": "SCHEDULED_ZONES", "message": "ignored"})));
        assert!(msg.text().starts_with("📊 Scheduled VWAP Deviation Zones"));
    }

    #[test]
    fn raw_body_is_embedded_verbatim() {
        assert_eq!(
            render_raw("XAUUSD crossed 1900"),
            RenderedMessage::plain("🔔 TradingView Alert (UNKNOWN)\nXAUUSD crossed 1900")
        );
    }

    #[test]
    fn render_body_dispatches_on_parse_result() {
        let structured = parse_body(None, br#"{"message":"hi"}"#);
        assert_eq!(render_body(&structured), Some(RenderedMessage::plain("hi")));
        let raw = parse_body(None, b"not json");
        assert_eq!(
            render_body(&raw),
            Some(RenderedMessage::plain("🔔 TradingView Alert (UNKNOWN)\nnot json"))
        );
        assert_eq!(render_body(&ParsedBody::Empty), None);
    }

    #[test]
    fn notification_type_tags() {
        assert_eq!(NotificationType::of(&event(json!({"type": " SCHEDULED_ZONES "}))), NotificationType::ScheduledZones);
        assert_eq!(NotificationType::of(&event(json!({"type": 3}))).as_str(), "3");
        assert_eq!(NotificationType::of(&event(json!({"type": {"a": 1}}))).as_str(), DEFAULT_TYPE);
        assert_eq!(NotificationType::of(&event(json!({"type": "  "}))).as_str(), DEFAULT_TYPE);
        assert_eq!(NotificationType::of(&event(json!({"type": "TV_TEST"}))).as_str(), "TV_TEST");
    }

    #[test]
    fn parse_mode_serializes_to_telegram_names() {
        assert_eq!(serde_json::to_value(ParseMode::Html).ok(), Some(json!("HTML")));
        assert_eq!(serde_json::to_value(ParseMode::MarkdownV2).ok(), Some(json!("MarkdownV2")));
        let msg = RenderedMessage::with_parse_mode("<b>x</b>", ParseMode::Html);
        assert_eq!(msg.parse_mode(), Some(ParseMode::Html));
    }
}
