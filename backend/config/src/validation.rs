//! Config validation: field checks with user-friendly messages.

use crate::schema::KeeperConfig;
use thiserror::Error;
use url::Url;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &KeeperConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_server(config, &mut report);
    validate_twilio(config, &mut report);
    report
}

fn validate_server(config: &KeeperConfig, report: &mut ValidationReport) {
    let server = &config.server;
    if server.port == 0 {
        report.error("server.port", "port must be between 1 and 65535");
    }
    if !server.webhook_path.starts_with('/') {
        report.error(
            "server.webhookPath",
            format!("'{}' must start with '/'", server.webhook_path),
        );
    }
    match Url::parse(&server.public_base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => report.error(
            "server.publicBaseUrl",
            format!("unsupported scheme '{}'; use http or https", url.scheme()),
        ),
        Err(e) => report.error("server.publicBaseUrl", format!("not a valid URL: {e}")),
    }
}

fn validate_twilio(config: &KeeperConfig, report: &mut ValidationReport) {
    let twilio = &config.twilio;
    if twilio.fetch_timeout_secs == 0 {
        report.error("twilio.fetchTimeoutSecs", "fetchTimeoutSecs must be >= 1");
    }
    if twilio.auth_token.is_none() {
        report.warn(
            "twilio.authToken",
            "No auth token configured; webhook signatures will not be validated",
        );
    }
    if twilio.fetch_media_with_auth && twilio.media_credentials().is_none() {
        report.warn(
            "twilio.fetchMediaWithAuth",
            "Authenticated media fetch requires both accountSid and authToken; fetching anonymously",
        );
    }
}
