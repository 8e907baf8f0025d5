//! Gateway HTTP server (single port).

use crate::config::{self, Settings};
use crate::relay::{RelayController, RelayOutcome};
use crate::sink::{MessageSink, TelegramSink};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

/// Shared state for the gateway: resolved settings and the relay pipeline.
#[derive(Clone)]
pub struct GatewayState {
    pub settings: Arc<Settings>,
    pub relay: Arc<RelayController>,
}

impl GatewayState {
    /// Build state with a Telegram sink configured from `settings`.
    pub fn from_settings(settings: Settings) -> Self {
        let sink = TelegramSink::new(settings.bot_token.clone(), settings.chat_id.clone())
            .with_api_base(settings.api_base.clone())
            .with_timeout(settings.timeout);
        if !sink.is_configured() {
            log::warn!(
                "telegram bot token or chat id not configured (TELEGRAM_BOT_TOKEN, TELEGRAM_CHAT_ID); deliveries will fail"
            );
        }
        Self::with_sink(settings, Arc::new(sink))
    }

    /// Build state around any sink.
    pub fn with_sink(settings: Settings, sink: Arc<dyn MessageSink>) -> Self {
        let relay = RelayController::new(settings.secret.clone(), sink);
        Self {
            settings: Arc::new(settings),
            relay: Arc::new(relay),
        }
    }
}

/// Routes: `GET /`, `POST /tv`, `GET /tg_test`.
pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(health_http))
        .route("/tv", post(tv_webhook))
        .route("/tg_test", get(tg_test))
        .with_state(state)
}

/// Run the gateway until SIGINT/SIGTERM.
pub async fn run_gateway(settings: Settings) -> Result<()> {
    let bind_addr = format!("{}:{}", settings.bind, settings.port);
    let loopback = config::is_loopback_bind(&settings.bind);
    let state = GatewayState::from_settings(settings);
    if !state.relay.requires_secret() && !loopback {
        log::warn!(
            "binding to {} without a shared secret; anyone who can reach /tv can post alerts",
            bind_addr
        );
    }
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server exited")?;
    log::info!("gateway stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// POST /tv — TradingView alert webhook. The content type is only a hint.
async fn tv_webhook(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> RelayOutcome {
    log::info!("/tv hit ({} bytes)", body.len());
    log::debug!("/tv headers: {:?}", headers);
    log::debug!("/tv raw body: {}", String::from_utf8_lossy(&body));
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    state.relay.handle(content_type, &body).await
}

/// GET /tg_test — deliver the fixed self-test message.
async fn tg_test(State(state): State<GatewayState>) -> RelayOutcome {
    let outcome = state.relay.self_test().await;
    log::info!("/tg_test: {}", outcome.body());
    outcome
}

/// GET / returns a simple health JSON for uptime checks.
async fn health_http(State(state): State<GatewayState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "port": state.settings.port,
    }))
}
