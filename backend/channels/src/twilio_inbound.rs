//! Inbound message parsing.
//!
//! The raw form is kept as ordered pairs (the signature covers every field),
//! and the fields the ingest pipeline acts on are validated once into
//! [`InboundMms`].

use keeper_core::PhoneNumber;
use thiserror::Error;
use url::{Url, form_urlencoded};

/// Decoded `application/x-www-form-urlencoded` body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormParams(Vec<(String, String)>);

impl FormParams {
    pub fn parse(body: &[u8]) -> Self {
        Self(
            form_urlencoded::parse(body)
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        )
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }
}

impl From<Vec<(String, String)>> for FormParams {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }
}

/// Why a form cannot be ingested as an MMS.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InboundError {
    #[error("sender (From) is missing")]
    MissingSender,

    #[error("NumMedia is missing, zero, or not a number")]
    NoMedia,

    #[error("MediaUrl0 is missing")]
    MissingMediaUrl,

    #[error("MediaUrl0 is not a fetchable URL: {0}")]
    InvalidMediaUrl(String),
}

impl InboundError {
    /// True when the message simply carried nothing to preserve, as opposed to
    /// a media reference that cannot be fetched.
    pub fn is_no_media(&self) -> bool {
        !matches!(self, InboundError::InvalidMediaUrl(_))
    }
}

/// A validated inbound MMS with at least one media attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMms {
    pub sender: PhoneNumber,
    pub media_count: u32,
    pub media_url: Url,
    /// Message text; empty when the sender attached media only.
    pub body: String,
    pub message_sid: Option<String>,
}

impl InboundMms {
    pub fn from_params(params: &FormParams) -> Result<Self, InboundError> {
        let sender = params
            .get("From")
            .and_then(PhoneNumber::parse)
            .ok_or(InboundError::MissingSender)?;

        let media_count = params
            .get("NumMedia")
            .and_then(|n| n.trim().parse::<u32>().ok())
            .filter(|n| *n > 0)
            .ok_or(InboundError::NoMedia)?;

        let raw_url = params
            .get("MediaUrl0")
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or(InboundError::MissingMediaUrl)?;

        let media_url = Url::parse(raw_url)
            .ok()
            .filter(|u| matches!(u.scheme(), "http" | "https"))
            .ok_or_else(|| InboundError::InvalidMediaUrl(raw_url.to_string()))?;

        Ok(Self {
            sender,
            media_count,
            media_url,
            body: params.get("Body").unwrap_or_default().to_string(),
            message_sid: params.get("MessageSid").map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> FormParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn decodes_urlencoded_body() {
        let params = FormParams::parse(b"From=%2B15551234567&Body=hello+there&NumMedia=1");
        assert_eq!(params.get("From"), Some("+15551234567"));
        assert_eq!(params.get("Body"), Some("hello there"));
        assert_eq!(params.pairs().len(), 3);
    }

    #[test]
    fn parses_complete_message() {
        let mms = InboundMms::from_params(&form(&[
            ("From", "+15551234567"),
            ("NumMedia", "2"),
            ("MediaUrl0", "https://api.twilio.com/media/ME1"),
            ("Body", "Thanksgiving"),
            ("MessageSid", "MM123"),
        ]))
        .unwrap();
        assert_eq!(mms.sender.as_str(), "+15551234567");
        assert_eq!(mms.media_count, 2);
        assert_eq!(mms.media_url.as_str(), "https://api.twilio.com/media/ME1");
        assert_eq!(mms.body, "Thanksgiving");
        assert_eq!(mms.message_sid.as_deref(), Some("MM123"));
    }

    #[test]
    fn missing_body_is_empty() {
        let mms = InboundMms::from_params(&form(&[
            ("From", "+15551234567"),
            ("NumMedia", "1"),
            ("MediaUrl0", "https://api.twilio.com/media/ME1"),
        ]))
        .unwrap();
        assert_eq!(mms.body, "");
    }

    #[test]
    fn no_media_cases() {
        let url = ("MediaUrl0", "https://api.twilio.com/media/ME1");
        let from = ("From", "+15551234567");

        for num_media in ["0", "abc", "", "-1"] {
            let err = InboundMms::from_params(&form(&[from, ("NumMedia", num_media), url]))
                .unwrap_err();
            assert_eq!(err, InboundError::NoMedia, "NumMedia={num_media:?}");
            assert!(err.is_no_media());
        }

        let err = InboundMms::from_params(&form(&[from, url])).unwrap_err();
        assert_eq!(err, InboundError::NoMedia);

        let err = InboundMms::from_params(&form(&[from, ("NumMedia", "1")])).unwrap_err();
        assert_eq!(err, InboundError::MissingMediaUrl);
        assert!(err.is_no_media());

        let err = InboundMms::from_params(&form(&[("NumMedia", "1"), url])).unwrap_err();
        assert_eq!(err, InboundError::MissingSender);
        assert!(err.is_no_media());
    }

    #[test]
    fn unfetchable_url_is_not_a_no_media_case() {
        let err = InboundMms::from_params(&form(&[
            ("From", "+15551234567"),
            ("NumMedia", "1"),
            ("MediaUrl0", "ftp://example.com/a.jpg"),
        ]))
        .unwrap_err();
        assert!(matches!(err, InboundError::InvalidMediaUrl(_)));
        assert!(!err.is_no_media());
    }
}
