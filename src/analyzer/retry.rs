//! Bounded reachability check
//!
//! A target is probed up to `max_attempts` times. Only transport failures
//! are retried: a status code from the target is deterministic, so it is
//! classified and returned on the attempt that produced it.

use crate::analyzer::fetcher::{FetchResult, PageFetcher};
use crate::{AnalysisResult, ClassifiedError};
use std::time::Duration;

/// How many times, and how far apart, a target is probed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy; `max_attempts` is raised to 1 if given as 0
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Total attempts, including the first
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Pause between consecutive attempts
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

/// Confirms that `url` answers with a 2xx status
///
/// # Retry Logic
///
/// | Attempt outcome | Action |
/// |-----------------|--------|
/// | 2xx | Return `Ok` immediately |
/// | Non-2xx status | Classify and return, no further attempts |
/// | Transport failure | Sleep `delay`, try again while attempts remain |
///
/// Once every attempt has failed at the transport level the result is an
/// `Unreachable` error naming the attempt count.
pub async fn check_reachable(
    fetcher: &dyn PageFetcher,
    url: &str,
    policy: &RetryPolicy,
) -> AnalysisResult<()> {
    let max_attempts = policy.max_attempts();

    for attempt in 1..=max_attempts {
        tracing::debug!("Attempt {}/{}: probing {}", attempt, max_attempts, url);

        match fetcher.fetch(url).await {
            FetchResult::Success { status_code, .. } => {
                tracing::info!(
                    "Successfully reached {} on attempt {} (HTTP {})",
                    url,
                    attempt,
                    status_code
                );
                return Ok(());
            }
            FetchResult::HttpError {
                status_code,
                message,
            } => {
                tracing::warn!("HTTP error {} for {}: {}", status_code, url, message);
                return Err(ClassifiedError::from_status(status_code, url, &message));
            }
            FetchResult::NetworkError { error } => {
                tracing::warn!(
                    "Attempt {}: failed to reach {}, error: {}",
                    attempt,
                    url,
                    error
                );
                if attempt < max_attempts {
                    tokio::time::sleep(policy.delay()).await;
                }
            }
        }
    }

    Err(ClassifiedError::unreachable(url, max_attempts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::testing::{network_error, ok_page, ScriptedFetcher};
    use crate::ErrorKind;
    use std::time::Instant;

    fn no_delay(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::ZERO)
    }

    #[test]
    fn test_policy_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_policy_requires_one_attempt() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts(), 1);
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let fetcher = ScriptedFetcher::new(vec![ok_page("<html></html>")]);

        let result = check_reachable(&fetcher, "http://example.com/", &no_delay(3)).await;

        assert!(result.is_ok());
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_exhausts_attempts_on_transport_failure() {
        let fetcher = ScriptedFetcher::new(vec![network_error(); 5]);

        let err = check_reachable(&fetcher, "http://example.com/", &no_delay(3))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Unreachable);
        assert_eq!(err.http_status, None);
        assert!(err.message.contains("after 3 attempts"));
        assert_eq!(fetcher.calls(), 3);
    }

    #[tokio::test]
    async fn test_success_on_second_attempt() {
        let fetcher = ScriptedFetcher::new(vec![network_error(), ok_page("<html></html>")]);

        let result = check_reachable(&fetcher, "http://example.com/", &no_delay(3)).await;

        assert!(result.is_ok());
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_status_error_is_not_retried() {
        let fetcher = ScriptedFetcher::new(vec![
            FetchResult::HttpError {
                status_code: 403,
                message: "Forbidden".to_string(),
            },
            ok_page("<html></html>"),
        ]);

        let err = check_reachable(&fetcher, "http://example.com/", &no_delay(3))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Forbidden);
        assert_eq!(err.http_status, Some(403));
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_status_error_after_transport_failure() {
        let fetcher = ScriptedFetcher::new(vec![
            network_error(),
            FetchResult::HttpError {
                status_code: 429,
                message: "Too Many Requests".to_string(),
            },
        ]);

        let err = check_reachable(&fetcher, "http://example.com/", &no_delay(3))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::RateLimited);
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_single_attempt_policy() {
        let fetcher = ScriptedFetcher::new(vec![network_error(), ok_page("")]);

        let err = check_reachable(&fetcher, "http://example.com/", &no_delay(1))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Unreachable);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_delay_between_attempts() {
        let fetcher = ScriptedFetcher::new(vec![network_error(); 3]);
        let policy = RetryPolicy::new(3, Duration::from_millis(25));

        let started = Instant::now();
        let _ = check_reachable(&fetcher, "http://example.com/", &policy).await;

        // Two pauses: none after the final attempt
        assert!(started.elapsed() >= Duration::from_millis(50));
        assert_eq!(fetcher.calls(), 3);
    }
}
