//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests with a per-request timeout
//! - Error classification into retryable and permanent failures
//!
//! Nothing is retried here. A caller that wants a retry policy can consult
//! [`FetchError::is_retryable`].

use crate::config::UserAgentConfig;
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;

/// Maximum number of redirects followed before giving up
const MAX_REDIRECTS: usize = 10;

/// Reasons a page could not be fetched
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP status {status}")]
    Status { status: u16 },

    #[error("not an HTML page (Content-Type: {content_type})")]
    ContentMismatch { content_type: String },

    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("failed to read response body: {0}")]
    Body(String),
}

impl FetchError {
    /// Whether a later attempt could plausibly succeed
    ///
    /// | Condition | Retryable |
    /// |-----------|-----------|
    /// | Timeout | yes |
    /// | Connection / network failure | yes |
    /// | HTTP 429, 5xx | yes |
    /// | Other HTTP status | no |
    /// | Non-HTML content, bad scheme | no |
    /// | Truncated body | yes |
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout | Self::Network(_) | Self::Body(_) => true,
            Self::Status { status } => *status == 429 || (500..600).contains(status),
            Self::ContentMismatch { .. } | Self::UnsupportedScheme(_) => false,
        }
    }

    fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_body() || error.is_decode() {
            Self::Body(error.to_string())
        } else {
            Self::Network(error.to_string())
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Upper bound for connecting and for a whole request
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use trawl::config::UserAgentConfig;
/// use trawl::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "trawl".to_string(),
///     crawler_version: "0.1".to_string(),
///     contact_url: "https://example.com/bot".to_string(),
///     contact_email: "bot@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(3)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Returns true for Content-Type values the traversal can make sense of
fn is_html_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime == "text/html" || mime == "application/xhtml+xml"
}

/// Fetches `url` and returns the final body after redirects, decoded with the
/// charset the response declares
///
/// A response without a Content-Type header is accepted; one that declares
/// a non-HTML type is not. Bodies without a charset are read as UTF-8, with
/// invalid sequences replaced.
pub async fn fetch_page(client: &Client, url: &str, timeout: Duration) -> Result<String, FetchError> {
    let parsed = url::Url::parse(url).map_err(|e| FetchError::Network(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(FetchError::UnsupportedScheme(parsed.scheme().to_string()));
    }

    let response = client
        .get(parsed)
        .timeout(timeout)
        .send()
        .await
        .map_err(FetchError::from_reqwest)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
        });
    }

    if let Some(content_type) = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    {
        if !is_html_content_type(content_type) {
            return Err(FetchError::ContentMismatch {
                content_type: content_type.to_string(),
            });
        }
    }

    response.text().await.map_err(FetchError::from_reqwest)
}
