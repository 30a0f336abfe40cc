//! Built-in configuration defaults.

pub const BIND_ADDRESS: &str = "0.0.0.0";

pub const PORT: u16 = 8080;

pub const WEBHOOK_PATH: &str = "/api/webhook";

pub const PUBLIC_BASE_URL: &str = "http://localhost:8080";

/// Seconds before a media download is abandoned.
pub const FETCH_TIMEOUT_SECS: u64 = 30;

pub const DB_PATH: &str = "archive-keeper.db";

pub const MEDIA_DIR: &str = "media";

pub const LOG_LEVEL: &str = "info";
