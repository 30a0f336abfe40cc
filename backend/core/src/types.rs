use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Caption used when an inbound message carries no text.
pub const DEFAULT_CAPTION: &str = "Preserved via MMS";

/// Document collection names shared with the web application.
pub mod collections {
    pub const CONTRIBUTORS: &str = "contributors";
    pub const GALLERY: &str = "gallery";
    pub const HISTORY: &str = "history";
}

/// Kind of gallery media, derived from the fetched content-type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// `video/*` is a video; everything else (including unknown types) is an image.
    pub fn from_content_type(content_type: &str) -> Self {
        if content_type.trim().to_ascii_lowercase().starts_with("video/") {
            MediaKind::Video
        } else {
            MediaKind::Image
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A photo or video in the family gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub url: String,
    pub caption: String,
    pub contributor: String,
    pub created_at: DateTime<Utc>,
}

impl GalleryItem {
    /// Gallery ids are `g`, the creation time in unix milliseconds, then a
    /// per-message `suffix` so messages in the same millisecond stay distinct.
    pub fn id_for(created_at: DateTime<Utc>, suffix: &str) -> String {
        format!("g{}-{suffix}", created_at.timestamp_millis())
    }

    /// Trimmed message text, or [`DEFAULT_CAPTION`] when there is none.
    pub fn caption_from_body(body: &str) -> String {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            DEFAULT_CAPTION.to_string()
        } else {
            trimmed.to_string()
        }
    }
}

/// Activity-log actions. The history collection is shared with the web app,
/// which also records edits and deletions, so every value it writes must
/// deserialize here even though the webhook only ever adds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryAction {
    Added,
    Updated,
    Deleted,
}

/// Kind of archive item a history entry refers to. Recipes and trivia are
/// authored in the web app; the webhook only writes gallery entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryItemType {
    Recipe,
    Gallery,
    Trivia,
}

/// Activity-log record shown in a contributor's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub contributor: String,
    pub action: HistoryAction,
    #[serde(rename = "type")]
    pub item_type: HistoryItemType,
    pub item_name: String,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    /// History record for a newly added gallery item, sharing its timestamp.
    /// The id is the gallery id with an `h` prefix in place of `g`.
    pub fn gallery_added(item: &GalleryItem) -> Self {
        let stem = item.id.strip_prefix('g').unwrap_or(&item.id);
        Self {
            id: format!("h{stem}"),
            contributor: item.contributor.clone(),
            action: HistoryAction::Added,
            item_type: HistoryItemType::Gallery,
            item_name: item.caption.clone(),
            timestamp: item.created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContributorRole {
    Admin,
    #[default]
    User,
}

impl ContributorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContributorRole::Admin => "admin",
            ContributorRole::User => "user",
        }
    }
}

impl fmt::Display for ContributorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContributorRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(ContributorRole::Admin),
            "user" => Ok(ContributorRole::User),
            other => Err(format!("unknown role '{other}', expected admin or user")),
        }
    }
}

/// A family member known to the archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributorProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub role: ContributorRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn classifies_by_content_type() {
        assert_eq!(MediaKind::from_content_type("video/mp4"), MediaKind::Video);
        assert_eq!(MediaKind::from_content_type("Video/QuickTime"), MediaKind::Video);
        assert_eq!(MediaKind::from_content_type("image/jpeg"), MediaKind::Image);
        assert_eq!(MediaKind::from_content_type("application/octet-stream"), MediaKind::Image);
    }

    #[test]
    fn blank_body_gets_default_caption() {
        assert_eq!(GalleryItem::caption_from_body(""), DEFAULT_CAPTION);
        assert_eq!(GalleryItem::caption_from_body("  \n"), DEFAULT_CAPTION);
        assert_eq!(GalleryItem::caption_from_body(" Grandma's pie "), "Grandma's pie");
    }

    #[test]
    fn gallery_item_uses_web_field_names() {
        let created_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let item = GalleryItem {
            id: GalleryItem::id_for(created_at, "3f2a"),
            kind: MediaKind::Video,
            url: "https://example.com/a.mp4".into(),
            caption: "Birthday".into(),
            contributor: "Jane Doe".into(),
            created_at,
        };
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["type"], "video");
        assert_eq!(value["id"], "g1714564800000-3f2a");
        assert_eq!(value["created_at"], "2024-05-01T12:00:00Z");
    }

    #[test]
    fn history_entry_mirrors_gallery_item() {
        let created_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let item = GalleryItem {
            id: GalleryItem::id_for(created_at, "3f2a"),
            kind: MediaKind::Image,
            url: "https://example.com/a.jpg".into(),
            caption: "Reunion".into(),
            contributor: "Jane Doe".into(),
            created_at,
        };
        let entry = HistoryEntry::gallery_added(&item);
        assert_eq!(entry.id, "h1714564800000-3f2a");
        assert_eq!(entry.timestamp, item.created_at);

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["itemName"], "Reunion");
        assert_eq!(value["type"], "gallery");
        assert_eq!(value["action"], "added");
    }

    #[test]
    fn reads_history_written_by_the_web_app() {
        let entry: HistoryEntry = serde_json::from_value(json!({
            "id": "h1714564800000",
            "contributor": "Jane Doe",
            "action": "updated",
            "type": "recipe",
            "itemName": "Apple pie",
            "timestamp": "2024-05-01T12:00:00Z",
        }))
        .unwrap();
        assert_eq!(entry.action, HistoryAction::Updated);
        assert_eq!(entry.item_type, HistoryItemType::Recipe);
    }

    #[test]
    fn same_millisecond_ids_differ_by_suffix() {
        let created_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_ne!(GalleryItem::id_for(created_at, "a1"), GalleryItem::id_for(created_at, "b2"));
    }

    #[test]
    fn contributor_tolerates_missing_optional_fields() {
        let profile: ContributorProfile =
            serde_json::from_value(json!({"id": "c1", "name": "Jane Doe", "phone": "+15551234567"}))
                .unwrap();
        assert_eq!(profile.role, ContributorRole::User);
        assert_eq!(profile.avatar, "");
        assert_eq!(profile.phone.as_deref(), Some("+15551234567"));
    }

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("Admin".parse::<ContributorRole>(), Ok(ContributorRole::Admin));
        assert_eq!(" user ".parse::<ContributorRole>(), Ok(ContributorRole::User));
        assert!("owner".parse::<ContributorRole>().is_err());
        assert_eq!(ContributorRole::Admin.to_string(), "admin");
    }
}
