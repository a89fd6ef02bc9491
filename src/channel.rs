//! Channel-name input parsing.
//!
//! The prompt accepts either a bare subreddit name (`rust`) or a pasted link
//! (`https://www.reddit.com/r/rust/`, `https://m.reddit.com/r/rust/comments/…`).

use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("enter a subreddit name or link")]
    Empty,
    #[error("`{0}` is not a subreddit name or link")]
    Invalid(String),
}

/// Extract the channel name from user input.
///
/// `feed_host` is the bare host links must point at (e.g. `reddit.com`);
/// `www.` and `m.` prefixes are accepted in front of it.
pub fn parse_channel(input: &str, feed_host: &str) -> Result<String, ChannelError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ChannelError::Empty);
    }
    if let Some(name) = channel_from_link(input, feed_host) {
        return Ok(name);
    }
    if is_channel_name(input) {
        Ok(input.to_string())
    } else {
        Err(ChannelError::Invalid(input.to_string()))
    }
}

fn channel_from_link(input: &str, feed_host: &str) -> Option<String> {
    let url = Url::parse(input).ok()?;
    if url.scheme() != "https" {
        return None;
    }

    let host = url.host_str()?;
    let bare = host
        .strip_prefix("www.")
        .or_else(|| host.strip_prefix("m."))
        .unwrap_or(host);
    if !bare.eq_ignore_ascii_case(feed_host) {
        return None;
    }

    let mut segments = url.path_segments()?;
    if segments.next()? != "r" {
        return None;
    }
    let name = segments.next()?;
    is_channel_name(name).then(|| name.to_string())
}

fn is_channel_name(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
