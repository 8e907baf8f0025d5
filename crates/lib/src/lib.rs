//! tvrelay core library: parse TradingView alert webhooks, check the shared
//! secret, render a plain-text notification and deliver it to Telegram.

pub mod auth;
pub mod config;
pub mod format;
pub mod gateway;
pub mod payload;
pub mod relay;
pub mod sink;
