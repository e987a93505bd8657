//! HTTP fetcher implementation
//!
//! This module handles all outbound HTTP requests, including:
//! - Building the shared HTTP client with browser-like request headers
//! - GET requests to fetch page content
//! - Separating status-coded failures from transport failures

use crate::config::{FetchConfig, UserAgentConfig};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

/// Maximum redirect hops followed before a request fails
const MAX_REDIRECTS: usize = 10;

/// Result of a fetch operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    /// The target answered with a 2xx status
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// The target answered with a non-2xx status
    HttpError {
        /// The HTTP status code
        status_code: u16,
        /// Canonical reason phrase, or a placeholder for unknown codes
        message: String,
    },

    /// No status was received (DNS failure, refused connection, timeout, ...)
    NetworkError {
        /// Error description
        error: String,
    },
}

/// Source of page content
///
/// The retry loop and the extractor only see this trait, so both can be
/// driven by scripted fetchers in tests.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Issues a single GET for `url`
    async fn fetch(&self, url: &str) -> FetchResult;
}

/// Builds an HTTP client with proper configuration
///
/// The client keeps no cookie store, so sharing it between concurrent
/// analyses leaks no per-request state.
///
/// # Arguments
///
/// * `user_agent` - Request identification headers
/// * `fetch` - Per-attempt timing limits
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use page_analyzer::analyzer::build_http_client;
/// use page_analyzer::config::{FetchConfig, UserAgentConfig};
///
/// let client = build_http_client(&UserAgentConfig::default(), &FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    fetch: &FetchConfig,
) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    if let Ok(accept) = HeaderValue::from_str(&user_agent.accept) {
        headers.insert(ACCEPT, accept);
    }
    if let Ok(language) = HeaderValue::from_str(&user_agent.accept_language) {
        headers.insert(ACCEPT_LANGUAGE, language);
    }

    Client::builder()
        .user_agent(user_agent.user_agent.as_str())
        .default_headers(headers)
        .timeout(Duration::from_secs(fetch.request_timeout_secs))
        .connect_timeout(Duration::from_secs(fetch.connect_timeout_secs))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`PageFetcher`] backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Wraps an existing client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client from configuration and wraps it
    pub fn from_config(
        user_agent: &UserAgentConfig,
        fetch: &FetchConfig,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(user_agent, fetch)?))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchResult {
        fetch_url(&self.client, url).await
    }
}

/// Fetches a URL and classifies the outcome
///
/// # Outcome Mapping
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx with readable body | Success |
/// | Any other status | HttpError |
/// | Timeout, refused connection, DNS failure | NetworkError |
/// | Body read failure after a 2xx | NetworkError |
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
///
/// # Returns
///
/// A FetchResult indicating success or the type of failure
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    match client.get(url).send().await {
        Ok(response) => {
            let status = response.status();
            let final_url = response.url().to_string();

            if !status.is_success() {
                return FetchResult::HttpError {
                    status_code: status.as_u16(),
                    message: status
                        .canonical_reason()
                        .unwrap_or("unknown status")
                        .to_string(),
                };
            }

            match response.text().await {
                Ok(body) => FetchResult::Success {
                    final_url,
                    status_code: status.as_u16(),
                    body,
                },
                Err(e) => FetchResult::NetworkError {
                    error: format!("Failed to read response body: {}", e),
                },
            }
        }
        Err(e) => {
            // Classify error
            let error = if e.is_timeout() {
                "Request timeout".to_string()
            } else if e.is_connect() {
                format!("Connection failed: {}", e)
            } else if e.is_redirect() {
                format!("Redirect limit exceeded: {}", e)
            } else {
                e.to_string()
            };
            FetchResult::NetworkError { error }
        }
    }
}
