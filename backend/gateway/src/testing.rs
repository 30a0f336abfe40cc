//! Collaborator doubles that count calls and inject failures.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Result, bail};
use async_trait::async_trait;
use bytes::Bytes;
use keeper_channels::FormParams;
use keeper_core::{
    DocumentStore, FetchedMedia, GalleryItem, HistoryEntry, MediaFetcher, ObjectStore, collections,
};
use keeper_store::InMemoryDocumentStore;
use serde_json::{Value, json};
use url::Url;

use crate::webhook::{MmsWebhook, WebhookConfig};

pub fn form(pairs: &[(&str, &str)]) -> FormParams {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect::<Vec<_>>()
        .into()
}

#[derive(Default)]
pub struct RecordingDocuments {
    inner: InMemoryDocumentStore,
    failing: Mutex<Option<&'static str>>,
    writes: Mutex<HashMap<String, usize>>,
}

impl RecordingDocuments {
    fn check(&self, collection: &str) -> Result<()> {
        if *self.failing.lock().unwrap() == Some(collection) {
            bail!("injected failure on {collection}");
        }
        Ok(())
    }

    /// Successful writes to `collection`.
    pub fn writes_to(&self, collection: &str) -> usize {
        self.writes.lock().unwrap().get(collection).copied().unwrap_or(0)
    }

    pub fn total_writes(&self) -> usize {
        self.writes.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl DocumentStore for RecordingDocuments {
    async fn query_by_field(&self, collection: &str, field: &str, value: &str) -> Result<Vec<Value>> {
        self.check(collection)?;
        self.inner.query_by_field(collection, field, value).await
    }

    async fn set(&self, collection: &str, id: &str, document: Value) -> Result<()> {
        self.check(collection)?;
        self.inner.set(collection, id, document).await?;
        *self
            .writes
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default() += 1;
        Ok(())
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>> {
        self.inner.list(collection).await
    }
}

#[derive(Default)]
pub struct StubObjects {
    fail_save: AtomicBool,
    fail_publish: AtomicBool,
    saved: Mutex<Vec<String>>,
}

impl StubObjects {
    pub fn saves(&self) -> usize {
        self.saved.lock().unwrap().len()
    }

    pub fn saved_keys(&self) -> Vec<String> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for StubObjects {
    async fn save(&self, key: &str, _data: Bytes, _content_type: &str) -> Result<()> {
        if self.fail_save.load(Ordering::SeqCst) {
            bail!("injected save failure");
        }
        self.saved.lock().unwrap().push(key.to_string());
        Ok(())
    }

    async fn make_public(&self, key: &str) -> Result<String> {
        if self.fail_publish.load(Ordering::SeqCst) {
            bail!("injected publish failure");
        }
        Ok(format!("https://cdn.example.com/{key}"))
    }
}

pub struct StubFetcher {
    content_type: Mutex<String>,
    fail: AtomicBool,
    calls: AtomicUsize,
}

impl Default for StubFetcher {
    fn default() -> Self {
        Self {
            content_type: Mutex::new("image/jpeg".into()),
            fail: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }
}

impl StubFetcher {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaFetcher for StubFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedMedia> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            bail!("media host returned 500 for {url}");
        }
        Ok(FetchedMedia {
            content_type: self.content_type.lock().unwrap().clone(),
            data: Bytes::from_static(b"media-bytes"),
        })
    }
}

/// One set of doubles shared by the webhooks a test builds.
#[derive(Default)]
pub struct Harness {
    pub documents: Arc<RecordingDocuments>,
    pub objects: Arc<StubObjects>,
    pub fetcher: Arc<StubFetcher>,
}

impl Harness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content_type(self, content_type: &str) -> Self {
        *self.fetcher.content_type.lock().unwrap() = content_type.to_string();
        self
    }

    pub fn with_fetch_failure(self) -> Self {
        self.fetcher.fail.store(true, Ordering::SeqCst);
        self
    }

    pub fn with_save_failure(self) -> Self {
        self.objects.fail_save.store(true, Ordering::SeqCst);
        self
    }

    pub fn with_publish_failure(self) -> Self {
        self.objects.fail_publish.store(true, Ordering::SeqCst);
        self
    }

    /// Fail every query and write against `collection`.
    pub fn with_store_failure(self, collection: &'static str) -> Self {
        *self.documents.failing.lock().unwrap() = Some(collection);
        self
    }

    pub fn webhook(&self, auth_token: Option<&str>) -> MmsWebhook {
        MmsWebhook::new(
            WebhookConfig {
                auth_token: auth_token.map(str::to_string),
            },
            self.documents.clone(),
            self.objects.clone(),
            self.fetcher.clone(),
        )
    }

    pub async fn add_contributor(&self, id: &str, name: &str, phone: &str) {
        self.documents
            .inner
            .set(
                collections::CONTRIBUTORS,
                id,
                json!({ "id": id, "name": name, "avatar": "", "role": "user", "phone": phone }),
            )
            .await
            .unwrap();
    }

    pub async fn only_gallery_item(&self) -> GalleryItem {
        let docs = self.documents.list(collections::GALLERY).await.unwrap();
        assert_eq!(docs.len(), 1, "expected exactly one gallery item");
        serde_json::from_value(docs[0].clone()).unwrap()
    }

    pub async fn only_history_entry(&self) -> HistoryEntry {
        let docs = self.documents.list(collections::HISTORY).await.unwrap();
        assert_eq!(docs.len(), 1, "expected exactly one history entry");
        serde_json::from_value(docs[0].clone()).unwrap()
    }
}
