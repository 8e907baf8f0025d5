//! Relay pipeline: parse → authorize → render → deliver, one request at a time.

use crate::auth;
use crate::format::{self, NotificationType, RenderedMessage};
use crate::payload;
use crate::sink::{DeliveryResult, MessageSink};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::Arc;

/// Fixed text delivered by the self-test endpoint.
pub const SELF_TEST_MESSAGE: &str = "✅ TradingView relay → Telegram test message";

/// Terminal state of one relayed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    Delivered(DeliveryResult),
    DeliveryFailed(DeliveryResult),
    Unauthorized,
    Unprocessable(String),
}

impl RelayOutcome {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayOutcome::Delivered(_) => StatusCode::OK,
            RelayOutcome::DeliveryFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RelayOutcome::Unauthorized => StatusCode::UNAUTHORIZED,
            RelayOutcome::Unprocessable(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, RelayOutcome::Delivered(_))
    }

    /// JSON body returned to the webhook caller.
    pub fn body(&self) -> serde_json::Value {
        match self {
            RelayOutcome::Delivered(r) | RelayOutcome::DeliveryFailed(r) => json!({
                "ok": r.delivered,
                "status": r.status_code,
                "detail": r.detail,
            }),
            RelayOutcome::Unauthorized => json!({ "ok": false, "error": "unauthorized" }),
            RelayOutcome::Unprocessable(reason) => json!({ "ok": false, "error": reason }),
        }
    }
}

impl IntoResponse for RelayOutcome {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

/// Runs the pipeline against a sink. Holds only read-only state, so one
/// instance is shared by all request handlers.
pub struct RelayController {
    secret: Option<String>,
    sink: Arc<dyn MessageSink>,
}

impl RelayController {
    /// `secret`: expected shared secret; `None` or empty disables the check.
    pub fn new(secret: Option<String>, sink: Arc<dyn MessageSink>) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()),
            sink,
        }
    }

    pub fn requires_secret(&self) -> bool {
        self.secret.is_some()
    }

    /// Relay one inbound request body.
    pub async fn handle(&self, content_type: Option<&str>, body: &[u8]) -> RelayOutcome {
        let parsed = payload::parse_body(content_type, body);
        log::debug!("relay: parsed {} body: {:?}", parsed.kind(), parsed);

        if !auth::authorize(&parsed, self.secret.as_deref()) {
            let incoming = parsed.event().map(|e| e.secret()).unwrap_or("");
            log::warn!(
                "relay: secret mismatch, rejecting {} body (incoming secret {})",
                parsed.kind(),
                if incoming.is_empty() { "absent" } else { "present" }
            );
            return RelayOutcome::Unauthorized;
        }

        let Some(message) = format::render_body(&parsed) else {
            log::warn!("relay: empty body, nothing to deliver");
            return RelayOutcome::Unprocessable("empty body".to_string());
        };
        let label = match parsed.event() {
            Some(event) => NotificationType::of(event).as_str().to_string(),
            None => "raw".to_string(),
        };
        self.deliver(&label, &message).await
    }

    /// Deliver the fixed self-test message, bypassing parsing and authorization.
    pub async fn self_test(&self) -> RelayOutcome {
        self.deliver("self-test", &RenderedMessage::plain(SELF_TEST_MESSAGE))
            .await
    }

    async fn deliver(&self, label: &str, message: &RenderedMessage) -> RelayOutcome {
        let result = self.sink.deliver(message).await;
        if result.delivered {
            log::info!("relay: {} delivered via {} (status {:?})", label, self.sink.id(), result.status_code);
            RelayOutcome::Delivered(result)
        } else {
            log::warn!("relay: {} not delivered via {}: {}", label, self.sink.id(), result.detail);
            RelayOutcome::DeliveryFailed(result)
        }
    }
}
