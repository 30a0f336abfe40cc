//! Environment handling for config values.
//!
//! Two layers: `${VAR_NAME}` references inside YAML string values are
//! resolved at load time (`$${VAR}` stays a literal `${VAR}`), and a fixed set
//! of variables overrides individual fields afterwards. Both take the
//! environment as a map so callers and tests control it.

use anyhow::{Context, Result, bail};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;

use crate::schema::KeeperConfig;

/// `${VAR}` with an optional leading `$` marking an escape.
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\$?)\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Snapshot of the process environment.
pub fn process_env() -> HashMap<String, String> {
    std::env::vars().collect()
}

/// Substitute `${VAR}` references in every string leaf of `value`.
///
/// Fails on the first reference to a variable that is unset or empty.
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => arr
            .iter()
            .enumerate()
            .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains("${") {
        return Ok(s.to_string());
    }

    let mut missing: Option<MissingEnvVarError> = None;
    let result = ENV_VAR_PATTERN.replace_all(s, |caps: &Captures| {
        let var_name = &caps[2];
        if !caps[1].is_empty() {
            return format!("${{{var_name}}}");
        }
        match env.get(var_name).filter(|v| !v.is_empty()) {
            Some(val) => val.clone(),
            None => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: var_name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    if let Some(err) = missing {
        bail!(err);
    }
    Ok(result.into_owned())
}

fn non_empty<'a>(env: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    env.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Apply `KEEPER_*`, `TWILIO_*`, and `RUST_LOG` overrides. Empty values are
/// treated as unset.
pub fn apply_env_overrides(config: &mut KeeperConfig, env: &HashMap<String, String>) -> Result<()> {
    if let Some(v) = non_empty(env, "KEEPER_BIND") {
        config.server.bind_address = v.to_string();
    }
    if let Some(v) = non_empty(env, "KEEPER_PORT") {
        config.server.port = v
            .parse()
            .with_context(|| format!("KEEPER_PORT is not a valid port: {v}"))?;
    }
    if let Some(v) = non_empty(env, "KEEPER_WEBHOOK_PATH") {
        config.server.webhook_path = v.to_string();
    }
    if let Some(v) = non_empty(env, "KEEPER_PUBLIC_URL") {
        config.server.public_base_url = v.to_string();
    }
    if let Some(v) = non_empty(env, "TWILIO_AUTH_TOKEN") {
        config.twilio.auth_token = Some(v.to_string());
    }
    if let Some(v) = non_empty(env, "TWILIO_ACCOUNT_SID") {
        config.twilio.account_sid = Some(v.to_string());
    }
    if let Some(v) = non_empty(env, "KEEPER_DB") {
        config.storage.db_path = v.to_string();
    }
    if let Some(v) = non_empty(env, "KEEPER_MEDIA_DIR") {
        config.storage.media_dir = v.to_string();
    }
    if let Some(v) = non_empty(env, "RUST_LOG") {
        config.logging.level = v.to_string();
    }
    if let Some(v) = non_empty(env, "KEEPER_LOG_DIR") {
        config.logging.log_dir = Some(v.to_string());
    }

    // A blank token in YAML means "no validation", same as an unset one.
    if config.twilio.auth_token.as_deref().is_some_and(|t| t.trim().is_empty()) {
        config.twilio.auth_token = None;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn substitutes_nested_var() {
        let v = json!({"twilio": {"authToken": "${TWILIO_TOKEN}"}});
        let result = resolve_env_vars_with(&v, &env(&[("TWILIO_TOKEN", "tok")])).unwrap();
        assert_eq!(result["twilio"]["authToken"], "tok");
    }

    #[test]
    fn error_names_missing_var_and_path() {
        let v = json!({"storage": {"dbPath": "${DATA_ROOT}/keeper.db"}});
        let err = resolve_env_vars_with(&v, &HashMap::new()).unwrap_err().to_string();
        assert!(err.contains("DATA_ROOT"));
        assert!(err.contains("storage.dbPath"));
    }

    #[test]
    fn escaped_reference_stays_literal() {
        let v = json!({"k": "$${HOME} and ${USER_NAME}"});
        let result = resolve_env_vars_with(&v, &env(&[("USER_NAME", "ada")])).unwrap();
        assert_eq!(result["k"], "${HOME} and ada");
    }

    #[test]
    fn overrides_replace_fields() {
        let mut cfg = KeeperConfig::default();
        apply_env_overrides(
            &mut cfg,
            &env(&[
                ("KEEPER_PORT", "9090"),
                ("TWILIO_AUTH_TOKEN", "secret"),
                ("KEEPER_MEDIA_DIR", "/var/keeper/media"),
                ("RUST_LOG", "debug"),
            ]),
        )
        .unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.twilio.auth_token.as_deref(), Some("secret"));
        assert_eq!(cfg.storage.media_dir, "/var/keeper/media");
        assert_eq!(cfg.logging.level, "debug");
    }

    #[test]
    fn empty_token_counts_as_unset() {
        let mut cfg = KeeperConfig::default();
        cfg.twilio.auth_token = Some("  ".into());
        apply_env_overrides(&mut cfg, &env(&[("TWILIO_AUTH_TOKEN", "")])).unwrap();
        assert_eq!(cfg.twilio.auth_token, None);
    }

    #[test]
    fn bad_port_is_an_error() {
        let mut cfg = KeeperConfig::default();
        assert!(apply_env_overrides(&mut cfg, &env(&[("KEEPER_PORT", "http")])).is_err());
    }
}
