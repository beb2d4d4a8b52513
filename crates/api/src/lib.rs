//! HTTP surface: the chat-channel webhook, health checks, and the message
//! pipeline wiring behind them.

pub mod app;
pub mod config;
