//! CLI Sign Command
//!
//! Computes the provider signature header for a hand-built webhook request,
//! so the endpoint can be exercised with curl while validation is on.

use anyhow::{Context, Result, bail};
use keeper_channels::compute_signature;
use keeper_config::KeeperConfig;

/// Parse a `KEY=VALUE` form parameter.
pub fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

/// Signature for `url` and `params` under the configured auth token.
pub fn sign(config: &KeeperConfig, url: &str, params: &[(String, String)]) -> Result<String> {
    let Some(token) = config.twilio.auth_token.as_deref() else {
        bail!("No auth token configured; set TWILIO_AUTH_TOKEN or twilio.authToken");
    };
    compute_signature(token, url, params).context("Auth token rejected as an HMAC key")
}

#[cfg(test)]
mod tests {
    use super::*;
    use keeper_channels::validate_signature;

    #[test]
    fn parses_params() {
        assert_eq!(
            parse_param("MediaUrl0=https://x.test/m?a=b"),
            Ok(("MediaUrl0".to_string(), "https://x.test/m?a=b".to_string()))
        );
        assert_eq!(parse_param("Body="), Ok(("Body".to_string(), String::new())));
        assert!(parse_param("=x").is_err());
        assert!(parse_param("NumMedia").is_err());
    }

    #[test]
    fn signature_validates_against_webhook() {
        let mut config = KeeperConfig::default();
        config.twilio.auth_token = Some("tok".into());
        let params = vec![("From".to_string(), "+15551234567".to_string())];
        let url = "https://archive.example.com/api/webhook";

        let sig = sign(&config, url, &params).unwrap();
        assert!(validate_signature("tok", url, &params, &sig));
    }

    #[test]
    fn requires_token() {
        assert!(sign(&KeeperConfig::default(), "https://x.test/", &[]).is_err());
    }
}
