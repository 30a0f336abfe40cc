//! Archive Keeper runtime configuration schema.
//!
//! Every section is optional in YAML; missing fields take the values in
//! [`crate::defaults`].

use serde::{Deserialize, Serialize};

use crate::defaults;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct KeeperConfig {
    /// HTTP listener and webhook routing
    pub server: ServerConfig,

    /// Telephony provider credentials and media download settings
    pub twilio: TwilioConfig,

    /// Document database and media directory
    pub storage: StorageConfig,

    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub webhook_path: String,
    /// Externally reachable base URL; published media URLs are built from it.
    pub public_base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: defaults::BIND_ADDRESS.to_string(),
            port: defaults::PORT,
            webhook_path: defaults::WEBHOOK_PATH.to_string(),
            public_base_url: defaults::PUBLIC_BASE_URL.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Twilio
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TwilioConfig {
    /// Signature validation is skipped when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_sid: Option<String>,
    /// Send `accountSid:authToken` as basic auth when downloading media.
    pub fetch_media_with_auth: bool,
    pub fetch_timeout_secs: u64,
}

impl Default for TwilioConfig {
    fn default() -> Self {
        Self {
            auth_token: None,
            account_sid: None,
            fetch_media_with_auth: false,
            fetch_timeout_secs: defaults::FETCH_TIMEOUT_SECS,
        }
    }
}

impl TwilioConfig {
    /// Credentials for media downloads, when enabled and complete.
    pub fn media_credentials(&self) -> Option<(&str, &str)> {
        if !self.fetch_media_with_auth {
            return None;
        }
        Some((self.account_sid.as_deref()?, self.auth_token.as_deref()?))
    }
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageConfig {
    pub db_path: String,
    pub media_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: defaults::DB_PATH.to_string(),
            media_dir: defaults::MEDIA_DIR.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `keeper_gateway=debug`.
    pub level: String,
    /// Daily-rolling JSON log files are written here when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            log_dir: None,
            json: false,
        }
    }
}
