//! Gallery media handling: classification, download, storage, and serving.

pub mod fetch;
pub mod media_server;
pub mod mime_detect;
pub mod object_store;

pub use fetch::HttpMediaFetcher;
pub use media_server::media_router;
pub use mime_detect::{detect_mime_type, extension_for_mime, is_inline_safe};
pub use object_store::{LocalObjectStore, validate_key};
