use crate::analyzer::RetryPolicy;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Page Analyzer
///
/// Every section is optional in the file; missing sections and keys fall
/// back to the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub retry: RetryConfig,
    pub fetch: FetchConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
}

impl Config {
    /// Resolves the retry policy consumed by the reachability check
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry.max_attempts,
            Duration::from_secs(self.retry.delay_secs),
        )
    }

    /// Aggregate deadline for one analysis, if enabled
    pub fn analysis_deadline(&self) -> Option<Duration> {
        match self.fetch.analysis_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub address: String,

    /// TCP port to bind
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Reachability retry configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts made before a target is declared unreachable
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Pause between attempts (seconds)
    #[serde(rename = "delay-secs")]
    pub delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_secs: 1,
        }
    }
}

/// Outbound request timing configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-attempt request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// TCP/TLS connect timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Deadline spanning the whole analysis (seconds, 0 disables)
    #[serde(rename = "analysis-timeout-secs")]
    pub analysis_timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            analysis_timeout_secs: 120,
        }
    }
}

/// Request identification headers
///
/// Browser-like values reduce the chance of targets blocking the analyzer.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Value of the User-Agent header
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Value of the Accept header
    pub accept: String,

    /// Value of the Accept-Language header
    #[serde(rename = "accept-language")]
    pub accept_language: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
                .to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"
                .to_string(),
            accept_language: "en-US,en;q=0.5".to_string(),
        }
    }
}
