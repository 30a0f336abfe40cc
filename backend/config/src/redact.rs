//! Config redaction: safe-to-log config snapshots with secrets masked.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::schema::KeeperConfig;

static SENSITIVE_KEYS: &[&str] = &[
    "authToken",
    "auth_token",
    "accountSid",
    "account_sid",
    "apiKey",
    "api_key",
    "token",
    "secret",
    "password",
];

/// Phone number pattern
static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[0-9]{10,15}$").unwrap());

/// Serialize `config` with every sensitive field masked.
pub fn redact(config: &KeeperConfig) -> Value {
    match serde_json::to_value(config) {
        Ok(value) => redact_value(&value),
        Err(_) => Value::Null,
    }
}

/// Mask sensitive keys and phone numbers anywhere in `value`.
pub fn redact_value(value: &Value) -> Value {
    redact_recursive(value, "")
}

fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

fn redact_string(s: &str, key: &str) -> Value {
    if s.is_empty() {
        return Value::String(String::new());
    }
    if is_sensitive_key(key) {
        // First four characters are enough to tell two secrets apart.
        let hint: String = s.chars().take(4).collect();
        if s.chars().count() > 4 {
            return Value::String(format!("{hint}***"));
        }
        return Value::String("***".to_string());
    }
    if PHONE_PATTERN.is_match(s) {
        let hint: String = s.chars().take(4).collect();
        return Value::String(format!("{hint}***"));
    }
    Value::String(s.to_string())
}

fn redact_recursive(value: &Value, key: &str) -> Value {
    match value {
        Value::String(s) => redact_string(s, key),
        Value::Array(arr) => Value::Array(arr.iter().map(|v| redact_recursive(v, key)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), redact_recursive(v, k)))
                .collect(),
        ),
        other => other.clone(),
    }
}
