//! Analysis pipeline for a single page
//!
//! This module contains the core analysis logic, including:
//! - HTTP fetching behind the [`PageFetcher`] seam
//! - Bounded reachability checking with retry
//! - HTML feature extraction
//! - The [`Analyzer`] that runs validate, probe and extract in order

mod extract;
mod fetcher;
mod retry;

pub use extract::{
    classify_href, contains_login_indicator, extract, parse_html, AnalysisReport, LinkClass,
    HEADING_LEVELS, LOGIN_KEYWORDS, NON_NAVIGABLE_SCHEMES,
};
pub use fetcher::{build_http_client, fetch_url, FetchResult, HttpFetcher, PageFetcher};
pub use retry::{check_reachable, RetryPolicy};

use crate::config::Config;
use crate::url::{normalize_url, validate_url};
use crate::{AnalysisResult, ClassifiedError, ErrorKind};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Runs one analysis per call; holds no per-request state
///
/// One `Analyzer` is shared by every inbound request. The fetcher it wraps
/// must be safe for concurrent use.
#[derive(Clone)]
pub struct Analyzer {
    fetcher: Arc<dyn PageFetcher>,
    policy: RetryPolicy,
    deadline: Option<Duration>,
}

impl Analyzer {
    /// Creates an analyzer without an aggregate deadline
    pub fn new(fetcher: Arc<dyn PageFetcher>, policy: RetryPolicy) -> Self {
        Self {
            fetcher,
            policy,
            deadline: None,
        }
    }

    /// Bounds the whole pipeline, retries included, by `deadline`
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Builds an analyzer backed by a real HTTP client
    ///
    /// # Returns
    ///
    /// * `Ok(Analyzer)` - Ready to serve requests
    /// * `Err(AnalyzerError)` - The HTTP client could not be built
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let fetcher = HttpFetcher::from_config(&config.user_agent, &config.fetch)?;
        let analyzer = Self::new(Arc::new(fetcher), config.retry_policy());
        Ok(analyzer.with_deadline(config.analysis_deadline()))
    }

    /// The retry policy used for reachability checks
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Analyzes the page at `raw_url`
    ///
    /// # Pipeline
    ///
    /// 1. Validate the input; fail with `InvalidInput`
    /// 2. Check reachability under the retry policy; propagate its error
    /// 3. Fetch once more and extract; propagate its error
    ///
    /// Nothing is retried here. Either a complete report or the first
    /// error is returned. With a deadline set, both phases share it: expiry
    /// during step 2 is `Unreachable`, expiry during step 3 is `FetchFailed`.
    pub async fn analyze(&self, raw_url: &str) -> AnalysisResult<AnalysisReport> {
        if !validate_url(raw_url) {
            tracing::debug!("Rejected invalid URL {:?}", raw_url);
            return Err(ClassifiedError::invalid_input());
        }

        let url = normalize_url(raw_url).map_err(|e| {
            tracing::debug!("Rejected URL {:?}: {}", raw_url, e);
            ClassifiedError::invalid_input()
        })?;

        let url = url.as_str();
        let deadline = self.deadline.map(|limit| Instant::now() + limit);

        match within(deadline, check_reachable(self.fetcher.as_ref(), url, &self.policy)).await {
            Some(result) => result?,
            None => {
                tracing::warn!("Analysis of {} timed out while checking reachability", url);
                return Err(ClassifiedError::new(
                    ErrorKind::Unreachable,
                    format!("analysis of {} timed out after {}", url, self.deadline_text()),
                ));
            }
        }

        let report = match within(deadline, extract(self.fetcher.as_ref(), url)).await {
            Some(result) => result?,
            None => {
                tracing::warn!("Analysis of {} timed out while fetching content", url);
                return Err(ClassifiedError::fetch_failed(
                    url,
                    &format!("timed out after {}", self.deadline_text()),
                ));
            }
        };

        tracing::info!("Analyzed {}", url);
        Ok(report)
    }

    fn deadline_text(&self) -> String {
        match self.deadline {
            Some(limit) => format!("{}s", limit.as_secs_f64()),
            None => "no deadline".to_string(),
        }
    }
}

/// Runs `fut` to completion, or until `deadline` passes
///
/// Returns `None` on expiry. The future is dropped, which cancels any
/// in-flight request or pending retry sleep.
async fn within<F: Future>(deadline: Option<Instant>, fut: F) -> Option<F::Output> {
    match deadline {
        Some(at) => tokio::time::timeout_at(at, fut).await.ok(),
        None => Some(fut.await),
    }
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("policy", &self.policy)
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}
