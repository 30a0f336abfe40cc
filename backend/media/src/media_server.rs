//! Serves published gallery objects over HTTP.
//!
//! Mount at `/media`:
//!   GET /media/*key: stream a published object, e.g. `/media/gallery/mms_1.jpg`

use std::{path::PathBuf, sync::Arc};

use axum::{
    Router,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tokio::fs;
use tracing::{debug, warn};

use crate::mime_detect::{detect_mime_type, is_inline_safe};
use crate::object_store::validate_key;

#[derive(Clone)]
pub struct MediaServerState {
    pub public_dir: Arc<PathBuf>,
}

/// Build the media server router over a store's public directory.
pub fn media_router(public_dir: PathBuf) -> Router {
    let state = MediaServerState {
        public_dir: Arc::new(public_dir),
    };
    Router::new()
        .route("/*key", get(serve_media))
        .with_state(state)
}

async fn serve_media(Path(key): Path<String>, State(state): State<MediaServerState>) -> Response {
    if validate_key(&key).is_err() {
        warn!(key = %key, "Rejected suspicious media path");
        return (StatusCode::BAD_REQUEST, "Invalid media key").into_response();
    }

    let path = state.public_dir.join(&key);
    debug!(path = %path.display(), "Serving media file");

    match fs::read(&path).await {
        Ok(bytes) => {
            let mime = detect_mime_type(&path);
            let filename = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("media");
            let disposition = if is_inline_safe(mime) {
                format!("inline; filename=\"{filename}\"")
            } else {
                format!("attachment; filename=\"{filename}\"")
            };

            let mut headers = HeaderMap::new();
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(mime));
            if let Ok(value) = HeaderValue::from_str(&disposition) {
                headers.insert(header::CONTENT_DISPOSITION, value);
            }
            headers.insert(
                header::CACHE_CONTROL,
                HeaderValue::from_static("public, max-age=86400"),
            );

            (StatusCode::OK, headers, bytes).into_response()
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            (StatusCode::NOT_FOUND, "Media not found").into_response()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read media file");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read media").into_response()
        }
    }
}
