//! Twilio request signature validation.
//!
//! Twilio signs every webhook with `X-Twilio-Signature`: the base64-encoded
//! HMAC-SHA1 (keyed with the account auth token) of the full callback URL
//! followed by each POST parameter as `key` + `value`, sorted by key.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use tracing::debug;
use url::{Position, Url};

type HmacSha1 = Hmac<Sha1>;

/// Header carrying the provider signature.
pub const SIGNATURE_HEADER: &str = "x-twilio-signature";

/// The string Twilio feeds into the HMAC for a given request.
fn signing_payload(url: &str, params: &[(String, String)]) -> String {
    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort();

    let mut payload = String::from(url);
    for (key, value) in sorted {
        payload.push_str(key);
        payload.push_str(value);
    }
    payload
}

/// HMAC over the signing payload for one URL spelling. `None` if the key is rejected.
fn signed_mac(auth_token: &str, url: &str, params: &[(String, String)]) -> Option<HmacSha1> {
    let mut mac = HmacSha1::new_from_slice(auth_token.as_bytes()).ok()?;
    mac.update(signing_payload(url, params).as_bytes());
    Some(mac)
}

/// Compute the signature Twilio would send for `url` and `params`.
pub fn compute_signature(auth_token: &str, url: &str, params: &[(String, String)]) -> Option<String> {
    let mac = signed_mac(auth_token, url, params)?;
    Some(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Check `signature` against the request.
///
/// Twilio may sign with or without the default port in the URL depending on
/// how the webhook was configured, so both spellings are accepted. The MAC
/// comparison is constant-time.
pub fn validate_signature(
    auth_token: &str,
    url: &str,
    params: &[(String, String)],
    signature: &str,
) -> bool {
    let Ok(expected) = STANDARD.decode(signature.trim()) else {
        debug!("Signature header is not valid base64");
        return false;
    };

    url_variants(url).iter().any(|candidate| {
        signed_mac(auth_token, candidate, params)
            .is_some_and(|mac| mac.verify_slice(&expected).is_ok())
    })
}

/// The URL as given, plus its forms with and without an explicit port.
fn url_variants(raw: &str) -> Vec<String> {
    let mut variants = vec![raw.to_string()];

    if let Ok(parsed) = Url::parse(raw) {
        if let (Some(host), Some(port)) = (parsed.host_str(), parsed.port_or_known_default()) {
            let rest = &parsed[Position::BeforePath..];
            let scheme = parsed.scheme();
            for candidate in [
                format!("{scheme}://{host}{rest}"),
                format!("{scheme}://{host}:{port}{rest}"),
            ] {
                if !variants.contains(&candidate) {
                    variants.push(candidate);
                }
            }
        }
    }

    variants
}
