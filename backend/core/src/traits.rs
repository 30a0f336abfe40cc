use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use url::Url;

/// JSON document collections (contributors, gallery, history).
///
/// Mirrors the narrow slice of a document database the webhook needs:
/// equality queries on a top-level field and whole-document writes by id.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents in `collection` whose top-level `field` equals `value`.
    async fn query_by_field(&self, collection: &str, field: &str, value: &str) -> Result<Vec<Value>>;

    /// Create or replace the document `id` in `collection`.
    async fn set(&self, collection: &str, id: &str, document: Value) -> Result<()>;

    /// Every document in `collection`, ordered by id.
    async fn list(&self, collection: &str) -> Result<Vec<Value>>;
}

/// Blob storage for gallery media.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Durably write `data` under `key`. The object is private until published.
    async fn save(&self, key: &str, data: Bytes, content_type: &str) -> Result<()>;

    /// Make a saved object publicly readable and return its public URL.
    async fn make_public(&self, key: &str) -> Result<String>;
}

/// Downloaded media and the content-type the origin reported for it.
#[derive(Debug, Clone)]
pub struct FetchedMedia {
    pub content_type: String,
    pub data: Bytes,
}

/// Retrieves inbound media from the provider's media URL.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Fails on transport errors and on non-success HTTP statuses.
    async fn fetch(&self, url: &Url) -> Result<FetchedMedia>;
}
