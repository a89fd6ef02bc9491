//! Subreddit listing client.
//!
//! Fetches `…/r/{channel}/new.json` pages over HTTP with [`reqwest`] and
//! decodes them into [`Page`]s.  Items are left raw; normalisation happens in
//! the polling engine.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use super::{FeedClient, FetchError, Page, RawItem};

/// Connection and identity settings for [`RedditClient`].
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Scheme and host the listing paths are appended to.
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// The public JSON endpoints throttle anonymous default user agents hard.
    pub user_agent: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "https://www.reddit.com".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            user_agent: concat!("livescroll-subreddit/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

// Wire shape: `{ data: { children: [{ data: {...} }], after: string|null } }`

#[derive(Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Deserialize)]
struct ListingData {
    children: Vec<Child>,
    #[serde(default)]
    after: Option<String>,
}

#[derive(Deserialize)]
struct Child {
    data: RawItem,
}

/// HTTP implementation of [`FeedClient`].
#[derive(Debug, Clone)]
pub struct RedditClient {
    client: reqwest::Client,
    base_url: String,
}

impl RedditClient {
    pub fn new(settings: ClientSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .user_agent(settings.user_agent)
            .build()
            .map_err(|e| FetchError::Network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build the listing URL for `channel`, adding `after` when a cursor is
    /// present.
    pub fn page_url(&self, channel: &str, cursor: Option<&str>) -> Result<Url, FetchError> {
        let mut url = Url::parse(&format!("{}/r/{channel}/new.json", self.base_url))
            .map_err(|e| FetchError::Network(format!("invalid feed url: {e}")))?;
        if let Some(after) = cursor.filter(|c| !c.is_empty()) {
            url.query_pairs_mut().append_pair("after", after);
        }
        Ok(url)
    }

    async fn request(&self, url: Url) -> Result<Page, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "listing request rejected");
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        parse_page(&body)
    }
}

#[async_trait]
impl FeedClient for RedditClient {
    async fn fetch_page(
        &self,
        channel: &str,
        cursor: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Page, FetchError> {
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }
        let url = self.page_url(channel, cursor)?;
        debug!(%url, "requesting listing page");

        // Dropping the losing branch drops the request future, which closes
        // the connection.
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("listing request aborted");
                Err(FetchError::Cancelled)
            }
            result = self.request(url) => result,
        }
    }
}

/// Decode a listing body.
///
/// Both `after: null` and `after: ""` mark the last page.
pub fn parse_page(body: &[u8]) -> Result<Page, FetchError> {
    let listing: Listing =
        serde_json::from_slice(body).map_err(|e| FetchError::MalformedResponse(e.to_string()))?;

    Ok(Page {
        items: listing.data.children.into_iter().map(|c| c.data).collect(),
        next_cursor: listing.data.after.filter(|after| !after.is_empty()),
    })
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::Network(format!("timeout: {err}"));
    }
    if err.is_decode() {
        return FetchError::MalformedResponse(err.to_string());
    }
    FetchError::Network(err.to_string())
}
