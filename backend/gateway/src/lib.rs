//! Archive Keeper Gateway HTTP API Server
//!
//! Hosts the inbound MMS webhook, the health check, and published media.

pub mod auth;
pub mod health_api;
pub mod outcome;
pub mod server;
pub mod webhook;

#[cfg(test)]
mod testing;

pub use outcome::Outcome;
pub use server::{GatewayState, build_router, start_server};
pub use webhook::{InboundRequest, MmsWebhook, WebhookConfig};
