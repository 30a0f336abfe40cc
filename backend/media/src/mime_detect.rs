//! MIME type <-> file extension mapping for stored media.
//!
//! Object keys get an extension derived from the fetched content-type, and
//! the media server recovers the content-type from that extension.

use std::path::Path;

/// `(extension, mime)` pairs. The first entry for a MIME type is its
/// preferred extension.
const MIME_TABLE: &[(&str, &str)] = &[
    // Images
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("heic", "image/heic"),
    ("heif", "image/heif"),
    ("bmp", "image/bmp"),
    ("tiff", "image/tiff"),
    ("tif", "image/tiff"),
    // Video (carrier MMS gateways mostly send these)
    ("mp4", "video/mp4"),
    ("3gp", "video/3gpp"),
    ("3g2", "video/3gpp2"),
    ("mov", "video/quicktime"),
    ("webm", "video/webm"),
    ("mpeg", "video/mpeg"),
    // Audio attachments still land in the gallery as files
    ("amr", "audio/amr"),
    ("mp3", "audio/mpeg"),
    ("m4a", "audio/mp4"),
    ("ogg", "audio/ogg"),
];

const FALLBACK_MIME: &str = "application/octet-stream";

/// Detect MIME type by file extension.
pub fn detect_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    MIME_TABLE
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
        .unwrap_or(FALLBACK_MIME)
}

/// File extension for a content-type header value.
///
/// Parameters (`; charset=...`) are ignored. Unknown types fall back to their
/// subtype when it is a plain token, else `bin`.
pub fn extension_for_mime(content_type: &str) -> String {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    if let Some((ext, _)) = MIME_TABLE.iter().find(|(_, m)| *m == mime) {
        return (*ext).to_string();
    }

    match mime.split_once('/') {
        Some((_, subtype))
            if !subtype.is_empty() && subtype.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            subtype.to_string()
        }
        _ => "bin".to_string(),
    }
}

/// Whether a file is safe to serve inline (not just download).
pub fn is_inline_safe(mime: &str) -> bool {
    matches!(
        mime,
        "image/jpeg" | "image/png" | "image/gif" | "image/webp" | "video/mp4" | "video/webm"
    )
}
