//! Webhook outcomes and their HTTP representation.
//!
//! Every application-level result is a `200` TwiML reply so the provider never
//! retries; the sender learns what happened from the reply text. Only a bad
//! signature is reported at the HTTP level.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use keeper_channels::{MessagingResponse, TWIML_CONTENT_TYPE};
use keeper_core::MediaKind;
use serde_json::json;

pub const NO_MEDIA_REPLY: &str =
    "archive keeper: no media detected. please text a photo or video to preserve it.";
pub const ERROR_REPLY: &str = "archive keeper: error preserving memory. please try again later.";
pub const INVALID_SIGNATURE: &str = "Invalid signature";

/// Result of processing one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Signature missing or wrong while a token is configured.
    AuthFailed,
    /// Nothing to preserve (no sender, no media count, or no media URL).
    NoMedia,
    /// The media could not be downloaded.
    FetchFailed,
    /// Contributor lookup, upload, publish, or a record write failed.
    PersistFailed,
    Success { contributor: String, kind: MediaKind },
}

fn success_reply(contributor: &str) -> String {
    format!(
        "archive keeper: memory preserved. thank you, {}. your mms submission has been added to the family gallery.",
        contributor.to_lowercase()
    )
}

impl Outcome {
    /// `(status, content-type, body)` for this outcome.
    pub fn to_http(&self) -> (StatusCode, &'static str, String) {
        let text = match self {
            Outcome::AuthFailed => {
                return (
                    StatusCode::FORBIDDEN,
                    "application/json",
                    json!({ "error": INVALID_SIGNATURE }).to_string(),
                );
            }
            Outcome::NoMedia => NO_MEDIA_REPLY.to_string(),
            Outcome::FetchFailed | Outcome::PersistFailed => ERROR_REPLY.to_string(),
            Outcome::Success { contributor, .. } => success_reply(contributor),
        };
        (
            StatusCode::OK,
            TWIML_CONTENT_TYPE,
            MessagingResponse::new().message(text).to_xml(),
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::AuthFailed => "auth_failed",
            Outcome::NoMedia => "no_media",
            Outcome::FetchFailed => "fetch_failed",
            Outcome::PersistFailed => "persist_failed",
            Outcome::Success { .. } => "success",
        }
    }
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        let (status, content_type, body) = self.to_http();
        (status, [(header::CONTENT_TYPE, content_type)], body).into_response()
    }
}

/// Response for any method other than POST on the webhook path.
pub async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method Not Allowed" })),
    )
        .into_response()
}
