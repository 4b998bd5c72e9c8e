// ABOUTME: fetches an author's recent casts from the feed api and renders them as prompt context.
// ABOUTME: reports non-200 responses and transport failures as errors instead of partial output.

use std::fmt;

use quiz_common::{Cast, FeedResponse};
use reqwest::header::ACCEPT;
use reqwest::StatusCode;

pub const DEFAULT_FEED_URL: &str = "https://api.neynar.com/v2/farcaster/feed/user/casts";

#[derive(Debug)]
pub enum FetchError {
    Status { status: StatusCode, body: String },
    Transport(reqwest::Error),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Status { status, body } => write!(f, "feed api returned {status}: {body}"),
            FetchError::Transport(err) => write!(f, "feed api request failed: {err}"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Status { .. } => None,
            FetchError::Transport(err) => Some(err),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedDigest {
    /// One `- <author> (<date>): <text>` line per cast with text.
    pub text: String,
    /// Number of casts the api returned, including skipped ones.
    pub cast_count: usize,
}

pub struct FeedClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
}

impl FeedClient {
    pub fn new(http: reqwest::Client, url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
            api_key: api_key.into(),
        }
    }

    pub async fn fetch_casts(&self, fid: u64, limit: u32) -> Result<Vec<Cast>, FetchError> {
        let fid = fid.to_string();
        let limit = limit.to_string();

        let response = self
            .http
            .get(&self.url)
            .header(ACCEPT, "application/json")
            .header("api_key", &self.api_key)
            .query(&[
                ("fid", fid.as_str()),
                ("limit", limit.as_str()),
                ("include_replies", "false"),
            ])
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        let feed: FeedResponse = response.json().await?;
        Ok(feed.casts)
    }

    pub async fn fetch_digest(&self, author_name: &str, fid: u64, limit: u32) -> Result<FeedDigest, FetchError> {
        let casts = self.fetch_casts(fid, limit).await?;
        Ok(FeedDigest {
            text: format_casts(author_name, &casts),
            cast_count: casts.len(),
        })
    }
}

pub fn format_casts(author_name: &str, casts: &[Cast]) -> String {
    let mut out = String::new();
    for cast in casts {
        let text = cast.text.replace('\n', " ");
        if text.is_empty() {
            continue;
        }
        out.push_str(&format!("- {author_name} ({}): {text}\n", cast.date()));
    }
    out
}
