pub mod error;
pub mod phone;
pub mod traits;
pub mod types;

pub use error::KeeperError;
pub use phone::PhoneNumber;
pub use traits::{DocumentStore, FetchedMedia, MediaFetcher, ObjectStore};
pub use types::{
    collections, ContributorProfile, ContributorRole, GalleryItem, HistoryAction, HistoryEntry,
    HistoryItemType, MediaKind, DEFAULT_CAPTION,
};
