//! Local filesystem object store.
//!
//! Objects are written under `<root>/private/<key>` and moved to
//! `<root>/public/<key>` when published. The public tree is what
//! [`crate::media_router`] serves, so a published object's URL is
//! `<public_base_url>/media/<key>`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use keeper_core::{KeeperError, ObjectStore};
use tokio::fs;
use tracing::{debug, info};

/// Reject keys that could escape the store root.
pub fn validate_key(key: &str) -> Result<(), KeeperError> {
    let bad = key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.split('/').any(|part| part.is_empty() || part == "." || part == "..");
    if bad {
        Err(KeeperError::InvalidKey(key.to_string()))
    } else {
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Directory the media server should serve.
    pub fn public_dir(&self) -> PathBuf {
        self.root.join("public")
    }

    fn private_path(&self, key: &str) -> PathBuf {
        self.root.join("private").join(key)
    }

    fn public_path(&self, key: &str) -> PathBuf {
        self.public_dir().join(key)
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/media/{}", self.public_base_url, key)
    }
}

/// `Ok(false)` only when the path is absent; other IO errors are returned.
async fn exists(path: &Path) -> Result<bool> {
    fs::try_exists(path)
        .await
        .with_context(|| format!("Failed to check {}", path.display()))
}

async fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Ok(())
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn save(&self, key: &str, data: Bytes, content_type: &str) -> Result<()> {
        validate_key(key)?;
        let path = self.private_path(key);
        ensure_parent(&path).await?;

        // Readers only ever see complete objects.
        let tmp = path.with_extension("partial");
        fs::write(&tmp, &data)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("Failed to finalize {}", path.display()))?;

        debug!(key = %key, bytes = data.len(), content_type = %content_type, "Saved object");
        Ok(())
    }

    async fn make_public(&self, key: &str) -> Result<String> {
        validate_key(key)?;
        let private = self.private_path(key);
        let public = self.public_path(key);

        if exists(&private).await? {
            ensure_parent(&public).await?;
            fs::rename(&private, &public)
                .await
                .with_context(|| format!("Failed to publish {key}"))?;
            info!(key = %key, "Published object");
        } else if !exists(&public).await? {
            return Err(KeeperError::ObjectNotFound(key.to_string()).into());
        }

        Ok(self.public_url(key))
    }
}
