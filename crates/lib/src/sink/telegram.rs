//! Telegram sink: one sendMessage call per notification via the Bot API.

use super::{DeliveryResult, MessageSink};
use crate::format::{ParseMode, RenderedMessage};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("missing telegram bot token")]
    MissingToken,
    #[error("missing telegram chat id")]
    MissingChatId,
    #[error("telegram request failed: {0}")]
    Request(reqwest::Error),
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<ParseMode>,
}

/// Sends notifications to a single chat. Token and chat id are optional so a
/// half-configured relay still starts; delivery then fails fast.
pub struct TelegramSink {
    token: Option<String>,
    chat_id: Option<String>,
    api_base: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl TelegramSink {
    pub fn new(token: Option<String>, chat_id: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.trim().is_empty()),
            chat_id: chat_id.filter(|c| !c.trim().is_empty()),
            api_base: TELEGRAM_API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
            client: reqwest::Client::new(),
        }
    }

    /// Point the sink at another Bot API server (self-hosted, or a mock in tests).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// True when both the bot token and the chat id are present.
    pub fn is_configured(&self) -> bool {
        self.token.is_some() && self.chat_id.is_some()
    }

    /// POST sendMessage. Returns the HTTP status and response body for any response received.
    pub async fn send_message(&self, message: &RenderedMessage) -> Result<(u16, String), TelegramError> {
        let token = self.token.as_deref().ok_or(TelegramError::MissingToken)?;
        let chat_id = self.chat_id.as_deref().ok_or(TelegramError::MissingChatId)?;
        let url = format!("{}/bot{}/sendMessage", self.api_base, token);
        let body = SendMessageRequest {
            chat_id,
            text: message.text(),
            parse_mode: message.parse_mode(),
        };
        // The request URL embeds the bot token; strip it from errors.
        let res = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| TelegramError::Request(e.without_url()))?;
        let status = res.status().as_u16();
        let text = res.text().await.unwrap_or_default();
        Ok((status, text))
    }
}

/// Telegram answers `{"ok": false, ...}` for rejected requests; treat anything else as accepted.
fn api_rejected(body: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("ok").and_then(|ok| ok.as_bool()))
        == Some(false)
}

#[async_trait]
impl MessageSink for TelegramSink {
    fn id(&self) -> &str {
        "telegram"
    }

    async fn deliver(&self, message: &RenderedMessage) -> DeliveryResult {
        match self.send_message(message).await {
            Ok((200, body)) if !api_rejected(&body) => DeliveryResult::delivered(200, body),
            Ok((status, body)) => {
                DeliveryResult::failed(Some(status), format!("sendMessage failed: {} {}", status, body))
            }
            Err(e) => DeliveryResult::failed(None, e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_token_fails_fast() {
        // Unroutable base: a network attempt would surface as a request error, not this detail.
        let sink = TelegramSink::new(None, Some("42".into())).with_api_base("http://127.0.0.1:9");
        let result = sink.deliver(&RenderedMessage::plain("hi")).await;
        assert_eq!(result, DeliveryResult::failed(None, "missing telegram bot token"));
    }

    #[tokio::test]
    async fn missing_chat_id_fails_fast() {
        let sink = TelegramSink::new(Some("123:abc".into()), Some("  ".into()))
            .with_api_base("http://127.0.0.1:9");
        assert!(!sink.is_configured());
        let result = sink.deliver(&RenderedMessage::plain("hi")).await;
        assert_eq!(result, DeliveryResult::failed(None, "missing telegram chat id"));
    }

    #[tokio::test]
    async fn transport_error_is_captured_without_token() {
        let sink = TelegramSink::new(Some("123:secret-token".into()), Some("42".into()))
            .with_api_base("http://127.0.0.1:9")
            .with_timeout(Duration::from_secs(2));
        let result = sink.deliver(&RenderedMessage::plain("hi")).await;
        assert!(!result.delivered);
        assert_eq!(result.status_code, None);
        assert!(result.detail.starts_with("telegram request failed"), "{}", result.detail);
        assert!(!result.detail.contains("secret-token"));
    }

    #[test]
    fn api_rejection_detection() {
        assert!(api_rejected(r#"{"ok":false,"error_code":400}"#));
        assert!(!api_rejected(r#"{"ok":true,"result":{}}"#));
        assert!(!api_rejected("not json"));
        assert!(!api_rejected(""));
    }

    #[test]
    fn api_base_trailing_slash_is_trimmed() {
        let sink = TelegramSink::new(None, None).with_api_base("http://localhost:8081/");
        assert_eq!(sink.api_base, "http://localhost:8081");
    }

    #[test]
    fn request_body_omits_parse_mode_for_plain_text() {
        let plain = serde_json::to_value(SendMessageRequest {
            chat_id: "42",
            text: "hi",
            parse_mode: None,
        })
        .expect("serialize");
        assert_eq!(plain, serde_json::json!({"chat_id": "42", "text": "hi"}));

        let html = serde_json::to_value(SendMessageRequest {
            chat_id: "42",
            text: "<b>hi</b>",
            parse_mode: Some(ParseMode::Html),
        })
        .expect("serialize");
        assert_eq!(html["parse_mode"], "HTML");
    }
}
