//! Webhook request authentication inputs.
//!
//! The service runs behind a reverse proxy, so the URL the provider signed is
//! rebuilt from the forwarded headers rather than the socket the request
//! arrived on.

use axum::http::{HeaderMap, Uri, header::HOST};
use keeper_channels::SIGNATURE_HEADER;

const FORWARDED_HOST: &str = "x-forwarded-host";
const FORWARDED_PROTO: &str = "x-forwarded-proto";

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        // Proxies chain values as "a, b"; the first is the client-facing one.
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// The externally visible URL of this request, or `None` when no host is known.
pub fn callback_url(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    let host = header_str(headers, FORWARDED_HOST).or_else(|| header_str(headers, HOST.as_str()))?;
    let proto = header_str(headers, FORWARDED_PROTO).unwrap_or("https");
    let path = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    Some(format!("{proto}://{host}{path}"))
}

/// The provider's signature header, if present.
pub fn signature(headers: &HeaderMap) -> Option<&str> {
    headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok())
}
