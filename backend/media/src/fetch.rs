//! Downloads inbound media from the provider.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use keeper_core::{FetchedMedia, KeeperError, MediaFetcher};
use reqwest::{Client, header::CONTENT_TYPE};
use tracing::{debug, warn};
use url::Url;

/// Content-type assumed when the media host does not send one.
pub const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

/// `reqwest`-backed [`MediaFetcher`]. Redirects (Twilio media URLs redirect
/// to a CDN) are followed.
#[derive(Clone)]
pub struct HttpMediaFetcher {
    client: Client,
    basic_auth: Option<(String, String)>,
}

impl HttpMediaFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("archive-keeper/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build media HTTP client")?;
        Ok(Self {
            client,
            basic_auth: None,
        })
    }

    /// Authenticate media requests, for accounts that protect media URLs.
    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.basic_auth = Some((username.into(), password.into()));
        self
    }
}

#[async_trait]
impl MediaFetcher for HttpMediaFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedMedia> {
        let mut request = self.client.get(url.clone());
        if let Some((user, password)) = &self.basic_auth {
            request = request.basic_auth(user, Some(password));
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Media request to {url} failed"))?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = status.as_u16(), "Media host returned an error status");
            return Err(KeeperError::MediaFetch {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        let data = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read media body from {url}"))?;

        debug!(url = %url, content_type = %content_type, bytes = data.len(), "Fetched media");
        Ok(FetchedMedia { content_type, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn fetcher() -> HttpMediaFetcher {
        HttpMediaFetcher::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn returns_body_and_content_type() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/media/ME1")
            .with_status(200)
            .with_header("content-type", "video/mp4")
            .with_body("mp4-bytes")
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/media/ME1", server.url())).unwrap();
        let media = fetcher().fetch(&url).await.unwrap();

        mock.assert_async().await;
        assert_eq!(media.content_type, "video/mp4");
        assert_eq!(&media.data[..], b"mp4-bytes");
    }

    #[tokio::test]
    async fn missing_content_type_defaults_to_jpeg() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/media/ME2")
            .with_status(200)
            .with_body("raw")
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/media/ME2", server.url())).unwrap();
        let media = fetcher().fetch(&url).await.unwrap();
        assert_eq!(media.content_type, DEFAULT_CONTENT_TYPE);
    }

    #[tokio::test]
    async fn error_status_is_a_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/media/gone")
            .with_status(404)
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/media/gone", server.url())).unwrap();
        let err = fetcher().fetch(&url).await.unwrap_err();
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn sends_basic_auth_when_configured() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/media/ME3")
            .match_header("authorization", Matcher::Regex("^Basic ".into()))
            .with_status(200)
            .with_header("content-type", "image/png")
            .with_body("png")
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/media/ME3", server.url())).unwrap();
        let media = fetcher()
            .with_basic_auth("AC123", "secret")
            .fetch(&url)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(media.content_type, "image/png");
    }
}
