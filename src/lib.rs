//! Page Analyzer: a single-page structural inspector
//!
//! This crate fetches one web page, confirms it is reachable under a bounded
//! retry policy, and extracts a small set of structural facts (title, heading
//! counts, link accessibility, login form presence) into a JSON report.

pub mod analyzer;
pub mod config;
pub mod server;
pub mod url;

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Main error type for Page Analyzer operations outside a single analysis
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Server error: {0}")]
    Server(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Taxonomy of analysis failures
///
/// Every failure surfaced by [`analyzer::Analyzer::analyze`] carries exactly
/// one of these kinds. The HTTP interface maps kinds to response status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The input is not a well-formed absolute http(s) URL
    InvalidInput,

    /// Target answered 403
    Forbidden,

    /// Target answered 429
    RateLimited,

    /// Target answered 404
    NotFound,

    /// Target answered 500
    RemoteServerError,

    /// Target answered some other non-2xx status
    UnclassifiedHttpError,

    /// Transport failures exhausted every attempt, or the aggregate deadline
    /// expired before the target answered
    Unreachable,

    /// The content fetch failed or timed out after reachability was confirmed
    FetchFailed,
}

impl ErrorKind {
    /// Returns the wire name of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::Forbidden => "forbidden",
            Self::RateLimited => "rate_limited",
            Self::NotFound => "not_found",
            Self::RemoteServerError => "remote_server_error",
            Self::UnclassifiedHttpError => "unclassified_http_error",
            Self::Unreachable => "unreachable",
            Self::FetchFailed => "fetch_failed",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An analysis failure tagged with its [`ErrorKind`]
///
/// The message is reported to callers verbatim. `http_status` is set only
/// when the target itself answered with a status code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    pub message: String,
    pub http_status: Option<u16>,
}

/// Message returned for input that fails URL validation
pub const INVALID_INPUT_MESSAGE: &str = "Invalid URL format\n\
Please provide a valid URL like\n\
https://www.example.com\n\
or\n\
http://www.example.com";

impl ClassifiedError {
    /// Creates an error without an associated HTTP status
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            http_status: None,
        }
    }

    /// Classifies a non-2xx status code returned by `url`
    ///
    /// | Status | Kind |
    /// |--------|------|
    /// | 403 | Forbidden |
    /// | 429 | RateLimited |
    /// | 404 | NotFound |
    /// | 500 | RemoteServerError |
    /// | other | UnclassifiedHttpError |
    pub fn from_status(status_code: u16, url: &str, detail: &str) -> Self {
        let (kind, message) = match status_code {
            403 => (
                ErrorKind::Forbidden,
                format!(
                    "access forbidden (403) for {} - website may block automated requests",
                    url
                ),
            ),
            429 => (
                ErrorKind::RateLimited,
                format!("too many requests (429) for {} - rate limited", url),
            ),
            404 => (
                ErrorKind::NotFound,
                format!("page not found (404) for {}", url),
            ),
            500 => (
                ErrorKind::RemoteServerError,
                format!("server error (500) for {}", url),
            ),
            other => (
                ErrorKind::UnclassifiedHttpError,
                format!("HTTP error {} for {}: {}", other, url, detail),
            ),
        };

        Self {
            kind,
            message,
            http_status: Some(status_code),
        }
    }

    /// The input failed URL validation
    pub fn invalid_input() -> Self {
        Self::new(ErrorKind::InvalidInput, INVALID_INPUT_MESSAGE)
    }

    /// Every attempt against `url` failed at the transport level
    pub fn unreachable(url: &str, attempts: u32) -> Self {
        Self::new(
            ErrorKind::Unreachable,
            format!("failed to reach {} after {} attempts", url, attempts),
        )
    }

    /// The content fetch of `url` failed after it was found reachable
    pub fn fetch_failed(url: &str, detail: &str) -> Self {
        Self::new(
            ErrorKind::FetchFailed,
            format!("failed to fetch content from {}: {}", url, detail),
        )
    }
}

/// Result type alias for Page Analyzer operations
pub type Result<T> = std::result::Result<T, AnalyzerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

/// Result type alias for a single analysis
pub type AnalysisResult<T> = std::result::Result<T, ClassifiedError>;

// Re-export commonly used types
pub use analyzer::{AnalysisReport, Analyzer, RetryPolicy};
pub use config::Config;
pub use crate::url::{normalize_url, validate_url};
