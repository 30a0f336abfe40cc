//! Inbound MMS ingest pipeline.
//!
//! authenticate -> parse -> fetch -> classify -> resolve contributor ->
//! upload -> publish -> gallery write -> history write. Each step runs in
//! order; the first failure decides the [`Outcome`].

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use keeper_channels::{FormParams, InboundMms, validate_signature};
use keeper_core::{
    DocumentStore, FetchedMedia, GalleryItem, HistoryEntry, MediaFetcher, MediaKind, ObjectStore,
    PhoneNumber, collections,
};
use keeper_logging::redact_sensitive_data;
use keeper_media::extension_for_mime;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::outcome::Outcome;

/// Settings injected into the webhook at construction.
#[derive(Debug, Clone, Default)]
pub struct WebhookConfig {
    /// Provider auth token. `None` disables signature validation.
    pub auth_token: Option<String>,
}

/// Everything the pipeline needs from one HTTP request.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    /// Externally visible URL the provider called, if it could be determined.
    pub callback_url: Option<String>,
    pub signature: Option<String>,
    pub params: FormParams,
}

pub struct MmsWebhook {
    config: WebhookConfig,
    documents: Arc<dyn DocumentStore>,
    objects: Arc<dyn ObjectStore>,
    fetcher: Arc<dyn MediaFetcher>,
}

impl MmsWebhook {
    pub fn new(
        config: WebhookConfig,
        documents: Arc<dyn DocumentStore>,
        objects: Arc<dyn ObjectStore>,
        fetcher: Arc<dyn MediaFetcher>,
    ) -> Self {
        Self {
            config,
            documents,
            objects,
            fetcher,
        }
    }

    pub fn signature_required(&self) -> bool {
        self.config.auth_token.is_some()
    }

    pub async fn handle(&self, request: InboundRequest) -> Outcome {
        if !self.authenticate(&request) {
            return Outcome::AuthFailed;
        }

        let mms = match InboundMms::from_params(&request.params) {
            Ok(mms) => mms,
            Err(reason) if reason.is_no_media() => {
                info!(reason = %reason, "Inbound message has no media to preserve");
                return Outcome::NoMedia;
            }
            Err(reason) => {
                warn!(reason = %reason, "Inbound media reference is unusable");
                return Outcome::FetchFailed;
            }
        };

        info!(
            sender = %mms.sender.masked(),
            media_count = mms.media_count,
            message_sid = mms.message_sid.as_deref().unwrap_or("-"),
            "Processing inbound MMS"
        );
        debug!(body = %redact_sensitive_data(&mms.body), "Inbound message body");

        let media = match self.fetcher.fetch(&mms.media_url).await {
            Ok(media) => media,
            Err(e) => {
                warn!(error = %e, "Failed to download inbound media");
                return Outcome::FetchFailed;
            }
        };
        let kind = MediaKind::from_content_type(&media.content_type);

        match self.persist(&mms, media, kind).await {
            Ok(item) => {
                info!(gallery_id = %item.id, kind = %kind, "Memory preserved");
                Outcome::Success {
                    contributor: item.contributor,
                    kind,
                }
            }
            Err(e) => {
                error!(error = ?e, "Failed to preserve inbound media");
                Outcome::PersistFailed
            }
        }
    }

    fn authenticate(&self, request: &InboundRequest) -> bool {
        let Some(token) = &self.config.auth_token else {
            return true;
        };

        let (Some(url), Some(signature)) = (&request.callback_url, &request.signature) else {
            warn!(
                has_url = request.callback_url.is_some(),
                has_signature = request.signature.is_some(),
                "Rejecting webhook without signature inputs"
            );
            return false;
        };

        let valid = validate_signature(token, url, request.params.pairs(), signature);
        if !valid {
            warn!(url = %url, "Rejecting webhook with invalid signature");
        }
        valid
    }

    /// Display name of the contributor who owns `sender`, or the masked
    /// number when nobody does.
    async fn resolve_contributor(&self, sender: &PhoneNumber) -> Result<String> {
        let matches = self
            .documents
            .query_by_field(collections::CONTRIBUTORS, "phone", sender.as_str())
            .await
            .context("Contributor lookup failed")?;

        let name = matches.iter().find_map(|doc| {
            doc.get("name")
                .and_then(|n| n.as_str())
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string)
        });

        Ok(name.unwrap_or_else(|| {
            debug!(sender = %sender.masked(), "No contributor on file for sender");
            sender.masked()
        }))
    }

    /// Upload, publish, and record the media. Not transactional: a failure
    /// leaves earlier steps in place and is only logged.
    async fn persist(&self, mms: &InboundMms, media: FetchedMedia, kind: MediaKind) -> Result<GalleryItem> {
        let contributor = self.resolve_contributor(&mms.sender).await?;

        let created_at = Utc::now();
        let suffix = Uuid::new_v4().simple().to_string();
        let key = format!(
            "gallery/mms_{}_{suffix}.{}",
            created_at.timestamp_millis(),
            extension_for_mime(&media.content_type)
        );

        self.objects
            .save(&key, media.data, &media.content_type)
            .await
            .with_context(|| format!("Failed to upload {key}"))?;
        let url = self
            .objects
            .make_public(&key)
            .await
            .with_context(|| format!("Failed to publish {key}"))?;

        let item = GalleryItem {
            id: GalleryItem::id_for(created_at, &suffix),
            kind,
            url,
            caption: GalleryItem::caption_from_body(&mms.body),
            contributor,
            created_at,
        };

        if let Err(e) = self
            .documents
            .set(collections::GALLERY, &item.id, serde_json::to_value(&item)?)
            .await
        {
            warn!(object_key = %key, "Published media has no gallery item");
            return Err(e.context(format!("Failed to write gallery item {}", item.id)));
        }

        let entry = HistoryEntry::gallery_added(&item);
        if let Err(e) = self
            .documents
            .set(collections::HISTORY, &entry.id, serde_json::to_value(&entry)?)
            .await
        {
            warn!(gallery_id = %item.id, "Gallery item has no history entry");
            return Err(e.context(format!("Failed to write history entry {}", entry.id)));
        }

        Ok(item)
    }
}
