//! The canonical record every listing entry is normalised into.
//!
//! `Thread` is what the accumulation holds, what the table renders and what
//! the export writes.  Raw listing entries arrive as untyped JSON objects;
//! [`normalize`] is the only place that knows the upstream field names.

use serde_json::Value;

use super::{FetchError, RawItem};

/// Prefix that turns a listing permalink into a browsable URL.
const PERMALINK_HOST: &str = "https://reddit.com";

/// A single thread, normalised from a listing entry.
///
/// Immutable once built: the accumulation only ever appends whole values.
#[derive(Debug, Clone, PartialEq)]
pub struct Thread {
    /// Display name of the poster (e.g. `spez`).
    pub author_name: String,

    /// Stable account id (`t2_…`).  Empty for deleted accounts.
    pub author_id: String,

    pub title: String,

    /// Self-text body; empty for link posts.
    pub body: String,

    /// Net upvotes at fetch time.
    pub score: i64,

    /// Fraction of votes that were upvotes, in `[0, 1]`.
    pub score_ratio: f64,

    /// Site-relative path, e.g. `/r/rust/comments/abc/title/`.
    pub permalink: String,
}

impl Thread {
    /// Field names in export column order.
    pub const FIELD_NAMES: [&'static str; 7] = [
        "authorName",
        "authorId",
        "title",
        "body",
        "score",
        "scoreRatio",
        "permalink",
    ];

    /// Field values rendered as text, in [`Thread::FIELD_NAMES`] order.
    pub fn field_values(&self) -> [String; 7] {
        [
            self.author_name.clone(),
            self.author_id.clone(),
            self.title.clone(),
            self.body.clone(),
            self.score.to_string(),
            self.score_ratio.to_string(),
            self.permalink.clone(),
        ]
    }

    /// Absolute URL of the thread.
    pub fn url(&self) -> String {
        format!("{PERMALINK_HOST}{}", self.permalink)
    }
}

/// Map one raw listing entry into a [`Thread`].
///
/// Pure: reads `raw` without modifying it.  Any required field that is absent
/// or has the wrong JSON type yields [`FetchError::MalformedItem`] naming that
/// field.
pub fn normalize(raw: &RawItem) -> Result<Thread, FetchError> {
    Ok(Thread {
        author_name: string_field(raw, "author")?,
        // Deleted accounts have no fullname.
        author_id: match raw.get("author_fullname") {
            None | Some(Value::Null) => String::new(),
            Some(_) => string_field(raw, "author_fullname")?,
        },
        title: string_field(raw, "title")?,
        body: string_field(raw, "selftext")?,
        score: raw
            .get("ups")
            .and_then(Value::as_i64)
            .ok_or_else(|| FetchError::MalformedItem("ups".into()))?,
        score_ratio: raw
            .get("upvote_ratio")
            .and_then(Value::as_f64)
            .ok_or_else(|| FetchError::MalformedItem("upvote_ratio".into()))?,
        permalink: string_field(raw, "permalink")?,
    })
}

fn string_field(raw: &RawItem, key: &str) -> Result<String, FetchError> {
    raw.get(key)
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| FetchError::MalformedItem(key.to_string()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    /// A well-formed listing entry, as the feed would send it.
    pub fn raw_item(author: &str, title: &str, ups: i64) -> RawItem {
        json!({
            "author": author,
            "author_fullname": format!("t2_{author}"),
            "title": title,
            "selftext": format!("body of {title}"),
            "ups": ups,
            "upvote_ratio": 0.9,
            "permalink": format!("/r/test/comments/{title}/"),
            "over_18": false,
        })
    }

    #[test]
    fn normalize_maps_every_field() {
        let thread = normalize(&raw_item("alice", "hello", 42)).unwrap();

        assert_eq!(thread.author_name, "alice");
        assert_eq!(thread.author_id, "t2_alice");
        assert_eq!(thread.title, "hello");
        assert_eq!(thread.body, "body of hello");
        assert_eq!(thread.score, 42);
        assert_eq!(thread.score_ratio, 0.9);
        assert_eq!(thread.permalink, "/r/test/comments/hello/");
    }

    #[test]
    fn normalize_does_not_touch_input() {
        let raw = raw_item("bob", "t", 1);
        let before = raw.clone();
        let _ = normalize(&raw);
        assert_eq!(raw, before);
    }

    #[test]
    fn missing_author_fullname_is_empty() {
        let mut raw = raw_item("[deleted]", "gone", 0);
        raw.as_object_mut().unwrap().remove("author_fullname");
        assert_eq!(normalize(&raw).unwrap().author_id, "");
    }

    #[test]
    fn missing_title_is_malformed() {
        let mut raw = raw_item("carol", "x", 1);
        raw.as_object_mut().unwrap().remove("title");
        assert_eq!(
            normalize(&raw).unwrap_err(),
            FetchError::MalformedItem("title".into())
        );
    }

    #[test]
    fn non_numeric_score_is_malformed() {
        let mut raw = raw_item("dave", "x", 1);
        raw["ups"] = json!("many");
        assert_eq!(
            normalize(&raw).unwrap_err(),
            FetchError::MalformedItem("ups".into())
        );
    }

    #[test]
    fn non_object_is_malformed() {
        assert!(matches!(
            normalize(&json!("not an object")),
            Err(FetchError::MalformedItem(_))
        ));
    }

    #[test]
    fn url_prefixes_permalink() {
        let thread = normalize(&raw_item("erin", "abc", 3)).unwrap();
        assert_eq!(thread.url(), "https://reddit.com/r/test/comments/abc/");
    }

    #[test]
    fn field_values_follow_field_names() {
        let thread = normalize(&raw_item("frank", "t", 5)).unwrap();
        let values = thread.field_values();
        assert_eq!(values.len(), Thread::FIELD_NAMES.len());
        assert_eq!(values[0], "frank");
        assert_eq!(values[4], "5");
        assert_eq!(values[5], "0.9");
    }
}
