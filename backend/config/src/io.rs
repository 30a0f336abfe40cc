//! Config file discovery and loading.

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Default config file name within the config directory.
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Per-user config directory, e.g. `~/.config/archive-keeper`.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("archive-keeper"))
        .unwrap_or_else(|| PathBuf::from(".archive-keeper"))
}

/// Pick the config file to load.
///
/// Priority: explicit path > `KEEPER_CONFIG` > `<config_dir>/config.yaml` if
/// it exists. `None` means run on defaults and environment only.
pub fn resolve_config_path(
    explicit: Option<&Path>,
    env: &HashMap<String, String>,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = env.get("KEEPER_CONFIG").filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    let default = config_dir().join(CONFIG_FILE_NAME);
    default.exists().then_some(default)
}

/// Read a YAML config file into a JSON value tree, ready for env
/// substitution. An empty file is an empty object.
pub async fn load_config_value(path: &Path) -> Result<Value> {
    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    if raw.trim().is_empty() {
        debug!(path = %path.display(), "Config file is empty; using defaults");
        return Ok(Value::Object(Default::default()));
    }

    serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins() {
        let env = HashMap::from([("KEEPER_CONFIG".to_string(), "/etc/keeper.yaml".to_string())]);
        let explicit = Path::new("./local.yaml");
        assert_eq!(
            resolve_config_path(Some(explicit), &env),
            Some(PathBuf::from("./local.yaml"))
        );
        assert_eq!(
            resolve_config_path(None, &env),
            Some(PathBuf::from("/etc/keeper.yaml"))
        );
    }

    #[tokio::test]
    async fn reads_yaml_and_empty_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        std::fs::write(&path, "server:\n  port: 9000\n").unwrap();
        let value = load_config_value(&path).await.unwrap();
        assert_eq!(value["server"]["port"], 9000);

        std::fs::write(&path, "\n").unwrap();
        assert!(load_config_value(&path).await.unwrap().as_object().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config_value(&dir.path().join("nope.yaml")).await.is_err());
    }
}
