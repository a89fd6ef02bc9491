//! Feed boundary.
//!
//! This module defines the [`FeedClient`] trait, the [`Page`] it returns and
//! the canonical [`Thread`] record.  The concrete HTTP implementation lives
//! in [`reddit`].
//!
//! ## For contributors — swapping the transport
//!
//! The polling engine only ever talks to `dyn FeedClient`, so tests (and any
//! alternative backend) just implement the trait.  A client must:
//!
//! 1. issue at most one request per `fetch_page` call,
//! 2. return [`FetchError::Cancelled`] as soon as the token fires, dropping
//!    the in-flight request,
//! 3. report the terminal page with `next_cursor: None`.
//!
//! No retries happen at this layer; the engine decides what is fatal.

mod error;
mod reddit;
mod thread;

pub use error::FetchError;
pub use reddit::{ClientSettings, RedditClient};
pub use thread::{normalize, Thread};

#[cfg(test)]
pub(crate) use thread::tests::raw_item;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// One untyped listing entry (`children[i].data`).
pub type RawItem = serde_json::Value;

/// A single page of a listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    /// Entries in the order the feed returned them.
    pub items: Vec<RawItem>,

    /// Cursor for the following page, or `None` when this is the last one.
    pub next_cursor: Option<String>,
}

impl Page {
    pub fn is_last(&self) -> bool {
        self.next_cursor.is_none()
    }
}

/// Source of listing pages for a channel.
#[async_trait]
pub trait FeedClient: Send + Sync {
    /// Fetch one page of `channel`, starting after `cursor` (or at the newest
    /// entry when `cursor` is `None`).
    async fn fetch_page(
        &self,
        channel: &str,
        cursor: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Page, FetchError>;
}
