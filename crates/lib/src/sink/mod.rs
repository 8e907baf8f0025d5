//! Delivery sinks for rendered notifications.
//!
//! A sink never returns an error: configuration gaps, API rejections and
//! transport failures are all reported through [`DeliveryResult`].

mod telegram;

pub use telegram::{TelegramError, TelegramSink, DEFAULT_TIMEOUT, TELEGRAM_API_BASE};

use crate::format::RenderedMessage;
use async_trait::async_trait;
use serde::Serialize;

/// Outcome of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryResult {
    pub delivered: bool,
    /// HTTP status returned by the chat API; `None` when no response was received.
    pub status_code: Option<u16>,
    pub detail: String,
}

impl DeliveryResult {
    pub fn delivered(status_code: u16, detail: impl Into<String>) -> Self {
        Self {
            delivered: true,
            status_code: Some(status_code),
            detail: detail.into(),
        }
    }

    pub fn failed(status_code: Option<u16>, detail: impl Into<String>) -> Self {
        Self {
            delivered: false,
            status_code,
            detail: detail.into(),
        }
    }
}

/// Destination for rendered notifications.
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Sink id for logs (e.g. "telegram").
    fn id(&self) -> &str;
    /// Make a single delivery attempt.
    async fn deliver(&self, message: &RenderedMessage) -> DeliveryResult;
}
