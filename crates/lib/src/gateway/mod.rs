//! Gateway: HTTP surface of the relay.
//!
//! `POST /tv` receives alerts, `GET /` is the liveness check and `GET /tg_test`
//! sends a fixed message through the sink.

mod server;

pub use server::{build_router, run_gateway, GatewayState};
