use thiserror::Error;

/// Top-level error type for the Archive Keeper runtime.
#[derive(Debug, Error)]
pub enum KeeperError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("object not found: {0}")]
    ObjectNotFound(String),

    #[error("invalid object key: {0}")]
    InvalidKey(String),

    #[error("media fetch from {url} failed with status {status}")]
    MediaFetch { url: String, status: u16 },
}
