//! `keeper-config`: Archive Keeper runtime configuration.
//!
//! Provides:
//! - Typed config schema with built-in defaults
//! - YAML loading with `${ENV_VAR}` substitution
//! - Environment variable overrides
//! - Config redaction for safe logging
//! - Validation into errors and warnings

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use env::{MissingEnvVarError, apply_env_overrides, process_env, resolve_env_vars_with};
pub use io::{config_dir, load_config_value, resolve_config_path};
pub use redact::{redact, redact_value};
pub use schema::{KeeperConfig, LoggingConfig, ServerConfig, StorageConfig, TwilioConfig};
pub use validation::{ConfigValidationError, ValidationReport, validate};

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

/// Load the config file (if any), substitute `${VAR}` references, and apply
/// environment overrides.
///
/// Validation is left to the caller so it can be reported once logging is up.
pub async fn load_and_prepare(
    explicit: Option<&Path>,
    env: &HashMap<String, String>,
) -> Result<KeeperConfig> {
    let mut config = match resolve_config_path(explicit, env) {
        Some(path) => {
            let raw = load_config_value(&path).await?;
            let value = resolve_env_vars_with(&raw, env)
                .with_context(|| format!("Failed to resolve env vars in {}", path.display()))?;
            serde_json::from_value(value)
                .with_context(|| format!("Invalid config in {}", path.display()))?
        }
        None => KeeperConfig::default(),
    };

    apply_env_overrides(&mut config, env)?;
    Ok(config)
}
