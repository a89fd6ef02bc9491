//! Failure taxonomy for the feed boundary.
//!
//! Every error a [`FeedClient`](super::FeedClient) or the item normaliser can
//! produce is one of these variants.  Only [`FetchError::Cancelled`] is
//! "quiet": the polling engine treats it as a user-requested stop rather than
//! a failure.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Connectivity problem or timeout before a response arrived.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status code.
    #[error("http status {0}")]
    HttpStatus(u16),

    /// The cancellation token fired before or during the request.
    #[error("cancelled")]
    Cancelled,

    /// The body could not be decoded into a listing page.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// A listing entry was missing a required field (or had the wrong type).
    #[error("malformed item: field `{0}` missing or invalid")]
    MalformedItem(String),
}
