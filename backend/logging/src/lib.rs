//! Telemetry and structured logging for Archive Keeper.
//!
//! Handles subscriber setup (console plus optional daily JSON files) and
//! scrubbing of free text before it reaches a log line.

pub mod logger;
pub mod redact;

pub use logger::init_logger;
pub use redact::redact_sensitive_data;
