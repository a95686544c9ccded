//! Free-text search classification.
//!
//! A query is one of three things, checked in this order:
//!
//! 1. something that looks like a URL (`contains '.'` and no whitespace),
//!    opened directly;
//! 2. `youtube <terms>`, searched on YouTube;
//! 3. anything else, searched on Google.
//!
//! The URL test is a heuristic and deliberately loose: `a.b` is a URL,
//! `St. Louis weather` is not. Changing it changes user-visible behaviour.

use crate::error::{DeskError, Result};
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

pub const YOUTUBE_PREFIX: &str = "youtube ";
pub const YOUTUBE_SEARCH_URL: &str = "https://www.youtube.com/results?search_query=";
pub const GOOGLE_SEARCH_URL: &str = "https://www.google.com/search?q=";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum QueryKind {
    #[strum(to_string = "url")]
    LiteralUrl,
    #[strum(to_string = "youtube")]
    YouTubeSearch,
    #[strum(to_string = "google")]
    GeneralSearch,
}

/// A classified search query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub raw: String,
    pub kind: QueryKind,
    pub destination: String,
}

impl SearchQuery {
    pub fn trimmed(&self) -> &str {
        self.raw.trim()
    }
}

/// Heuristic URL test: a dot somewhere and no whitespace anywhere.
pub fn is_likely_url(input: &str) -> bool {
    input.contains('.') && !input.chars().any(char::is_whitespace)
}

/// `application/x-www-form-urlencoded` encoding: space becomes `+`.
pub fn form_encode(text: &str) -> String {
    form_urlencoded::byte_serialize(text.as_bytes()).collect()
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&text[prefix.len()..])
    } else {
        None
    }
}

/// Classify a raw query and build its destination URL.
pub fn classify(raw: &str) -> Result<SearchQuery> {
    let query = raw.trim();
    if query.is_empty() {
        return Err(DeskError::EmptyQuery);
    }

    let (kind, destination) = if is_likely_url(query) {
        let destination = if query.starts_with("http://") || query.starts_with("https://") {
            query.to_string()
        } else {
            format!("http://{query}")
        };
        (QueryKind::LiteralUrl, destination)
    } else if let Some(rest) = strip_prefix_ignore_case(query, YOUTUBE_PREFIX) {
        (
            QueryKind::YouTubeSearch,
            format!("{YOUTUBE_SEARCH_URL}{}", form_encode(rest.trim())),
        )
    } else {
        (
            QueryKind::GeneralSearch,
            format!("{GOOGLE_SEARCH_URL}{}", form_encode(query)),
        )
    };

    tracing::debug!(%kind, %destination, "classified query");
    Ok(SearchQuery {
        raw: raw.to_string(),
        kind,
        destination,
    })
}
