//! Bounded retry with polling.
//!
//! One combinator for "attempt, suppress transient failures, try again
//! until a deadline". An attempt yields `Ok(Some(_))` on success, `Ok(None)`
//! on a clean miss and `Err(_)` on failure; transient errors are swallowed
//! and the attempt restarts, anything else aborts the loop.

use crate::result::PagebookError;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::debug;

/// Default inter-attempt delay in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Default overall timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;

/// Configuration for retry behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total timeout duration
    pub timeout: Duration,
    /// Interval between attempts, capped at the remaining time
    pub poll_interval: Duration,
    /// Maximum number of attempts (0 = unlimited within timeout)
    pub max_retries: usize,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_TIMEOUT_MS))
    }
}

impl RetryConfig {
    /// Create a new retry config with timeout
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            max_retries: 0,
        }
    }

    /// Set the timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the poll interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set maximum attempts
    #[must_use]
    pub const fn with_max_retries(mut self, max: usize) -> Self {
        self.max_retries = max;
        self
    }

    /// Create a fast config (short timeout, fast polling)
    #[must_use]
    pub const fn fast() -> Self {
        Self {
            timeout: Duration::from_millis(500),
            poll_interval: Duration::from_millis(25),
            max_retries: 0,
        }
    }

    /// Create a slow config (long timeout, slower polling)
    #[must_use]
    pub const fn slow() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            poll_interval: Duration::from_millis(500),
            max_retries: 0,
        }
    }
}

/// Successful retry result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryOutcome<T> {
    /// Produced value
    pub value: T,
    /// Number of attempts, including the successful one
    pub attempts: u32,
    /// Time spent
    pub elapsed: Duration,
}

/// Why a retry loop gave up
#[derive(Debug, Error)]
pub enum RetryError {
    /// Deadline or attempt budget exhausted
    #[error(
        "gave up after {attempts} attempt(s) in {}ms{}",
        .elapsed.as_millis(),
        .last_error.as_ref().map(|e| format!(": {e}")).unwrap_or_default()
    )]
    Exhausted {
        /// Attempts made
        attempts: u32,
        /// Time spent
        elapsed: Duration,
        /// Last suppressed transient error
        last_error: Option<String>,
    },

    /// Non-transient error raised by an attempt
    #[error(transparent)]
    Fatal(#[from] PagebookError),
}

/// Retry loop bounded by a wall-clock deadline
#[derive(Debug, Clone, Default)]
pub struct BoundedRetry {
    config: RetryConfig,
    description: Option<String>,
}

impl BoundedRetry {
    /// Create a retry loop from config
    #[must_use]
    pub const fn new(config: RetryConfig) -> Self {
        Self {
            config,
            description: None,
        }
    }

    /// Label used in log events
    #[must_use]
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Get the current config
    #[must_use]
    pub const fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Run `attempt` until it yields a value, a non-transient error, or the
    /// deadline passes. The attempt closure receives the 1-based attempt
    /// number.
    ///
    /// # Errors
    ///
    /// [`RetryError::Fatal`] for a non-transient error, otherwise
    /// [`RetryError::Exhausted`] once the deadline or attempt budget is spent.
    pub async fn run<T, F, Fut>(&self, mut attempt: F) -> Result<RetryOutcome<T>, RetryError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<Option<T>, PagebookError>>,
    {
        let desc = self.description.as_deref().unwrap_or("retry");
        let start = Instant::now();
        let mut attempts: u32 = 0;
        let mut last_kind: Option<&'static str> = None;
        let mut last_error: Option<String> = None;

        loop {
            attempts += 1;

            match attempt(attempts).await {
                Ok(Some(value)) => {
                    return Ok(RetryOutcome {
                        value,
                        attempts,
                        elapsed: start.elapsed(),
                    });
                }
                Ok(None) => {}
                Err(err) if err.is_transient() => {
                    let kind = err.kind();
                    if last_kind != Some(kind) {
                        debug!(%desc, attempt = attempts, kind, error = %err, "suppressed transient error");
                    }
                    last_kind = Some(kind);
                    last_error = Some(err.to_string());
                }
                Err(err) => return Err(RetryError::Fatal(err)),
            }

            let elapsed = start.elapsed();
            let budget_spent =
                self.config.max_retries > 0 && attempts as usize >= self.config.max_retries;
            if elapsed >= self.config.timeout || budget_spent {
                return Err(RetryError::Exhausted {
                    attempts,
                    elapsed,
                    last_error,
                });
            }

            let remaining = self.config.timeout.saturating_sub(elapsed);
            tokio::time::sleep(self.config.poll_interval.min(remaining)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::PagebookResult;

    mod config_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let config = RetryConfig::default();
            assert_eq!(config.timeout, Duration::from_millis(15_000));
            assert_eq!(config.poll_interval, Duration::from_millis(50));
            assert_eq!(config.max_retries, 0);
        }

        #[test]
        fn test_builders_and_presets() {
            let config = RetryConfig::fast()
                .with_timeout(Duration::from_millis(200))
                .with_poll_interval(Duration::from_millis(5))
                .with_max_retries(3);
            assert_eq!(config.timeout, Duration::from_millis(200));
            assert_eq!(config.poll_interval, Duration::from_millis(5));
            assert_eq!(config.max_retries, 3);
            assert!(RetryConfig::slow().timeout > RetryConfig::fast().timeout);
        }
    }

    mod run_tests {
        use super::*;

        fn quick(timeout_ms: u64) -> BoundedRetry {
            BoundedRetry::new(
                RetryConfig::new(Duration::from_millis(timeout_ms))
                    .with_poll_interval(Duration::from_millis(5)),
            )
        }

        #[tokio::test]
        async fn test_immediate_success() {
            let out = quick(100)
                .run(|_| async { PagebookResult::Ok(Some(7)) })
                .await
                .unwrap();
            assert_eq!(out.value, 7);
            assert_eq!(out.attempts, 1);
        }

        #[tokio::test]
        async fn test_transient_errors_are_suppressed() {
            let out = quick(1_000)
                .run(|n| async move {
                    if n <= 3 {
                        Err(PagebookError::driver(format!("flaky {n}")))
                    } else {
                        Ok(Some(n))
                    }
                })
                .await
                .unwrap();
            assert_eq!(out.value, 4);
            assert_eq!(out.attempts, 4);
        }

        #[tokio::test]
        async fn test_fatal_error_surfaces_immediately() {
            let err = quick(1_000)
                .run(|_| async {
                    PagebookResult::<Option<()>>::Err(PagebookError::PageNotFound {
                        page: "Nowhere".into(),
                    })
                })
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                RetryError::Fatal(PagebookError::PageNotFound { .. })
            ));
        }

        #[tokio::test]
        async fn test_deadline_is_respected() {
            let start = std::time::Instant::now();
            let err = quick(60)
                .run(|_| async { PagebookResult::<Option<()>>::Ok(None) })
                .await
                .unwrap_err();
            let elapsed = start.elapsed();
            assert!(elapsed >= Duration::from_millis(60));
            assert!(elapsed < Duration::from_millis(60 + 250));
            match err {
                RetryError::Exhausted {
                    attempts,
                    last_error,
                    ..
                } => {
                    assert!(attempts > 1);
                    assert!(last_error.is_none());
                }
                RetryError::Fatal(e) => panic!("unexpected fatal error: {e}"),
            }
        }

        #[tokio::test]
        async fn test_exhausted_keeps_last_transient_message() {
            let err = quick(30)
                .run(|_| async {
                    PagebookResult::<Option<()>>::Err(PagebookError::StaleElement {
                        element: "e1".into(),
                        message: "detached".into(),
                    })
                })
                .await
                .unwrap_err();
            assert!(err.to_string().contains("detached"));
        }

        #[tokio::test]
        async fn test_max_retries_bounds_attempts() {
            let retry = BoundedRetry::new(
                RetryConfig::new(Duration::from_secs(10))
                    .with_poll_interval(Duration::from_millis(1))
                    .with_max_retries(3),
            );
            let err = retry
                .run(|_| async { PagebookResult::<Option<()>>::Ok(None) })
                .await
                .unwrap_err();
            assert!(matches!(err, RetryError::Exhausted { attempts: 3, .. }));
        }
    }

    mod logging_tests {
        use super::*;
        use std::fmt;
        use std::sync::{Arc, Mutex};
        use tracing::field::{Field, Visit};
        use tracing_subscriber::layer::{Context, SubscriberExt};
        use tracing_subscriber::Layer;

        /// Collects the `kind` field of every suppressed-error event
        #[derive(Clone, Default)]
        struct SuppressedKinds(Arc<Mutex<Vec<String>>>);

        #[derive(Default)]
        struct EventFields {
            message: Option<String>,
            kind: Option<String>,
        }

        impl Visit for EventFields {
            fn record_str(&mut self, field: &Field, value: &str) {
                if field.name() == "kind" {
                    self.kind = Some(value.to_string());
                }
            }

            fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
                if field.name() == "message" {
                    self.message = Some(format!("{value:?}"));
                }
            }
        }

        impl<S: tracing::Subscriber> Layer<S> for SuppressedKinds {
            fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
                let mut fields = EventFields::default();
                event.record(&mut fields);
                if fields.message.as_deref() == Some("suppressed transient error") {
                    if let Some(kind) = fields.kind {
                        self.0.lock().unwrap().push(kind);
                    }
                }
            }
        }

        fn stale() -> PagebookError {
            PagebookError::StaleElement {
                element: "e1".into(),
                message: "detached".into(),
            }
        }

        #[tokio::test]
        async fn test_suppressed_errors_logged_on_kind_change_only() {
            let kinds = SuppressedKinds::default();
            let subscriber = tracing_subscriber::registry().with(kinds.clone());
            let _guard = tracing::subscriber::set_default(subscriber);

            let retry = BoundedRetry::new(
                RetryConfig::new(Duration::from_secs(5)).with_poll_interval(Duration::from_millis(1)),
            )
            .with_description("rows");
            let out = retry
                .run(|n| async move {
                    match n {
                        1 | 2 | 5 => Err(PagebookError::driver(format!("flaky {n}"))),
                        3 | 4 => Err(stale()),
                        _ => Ok(Some(n)),
                    }
                })
                .await
                .unwrap();
            assert_eq!(out.attempts, 6);

            let logged = kinds.0.lock().unwrap().clone();
            assert_eq!(logged, vec!["driver", "stale_element", "driver"]);
        }

        #[tokio::test]
        async fn test_repeated_kind_logged_once() {
            let kinds = SuppressedKinds::default();
            let subscriber = tracing_subscriber::registry().with(kinds.clone());
            let _guard = tracing::subscriber::set_default(subscriber);

            let err = BoundedRetry::new(
                RetryConfig::new(Duration::from_secs(5))
                    .with_poll_interval(Duration::from_millis(1))
                    .with_max_retries(4),
            )
            .run(|_| async { PagebookResult::<Option<()>>::Err(stale()) })
            .await
            .unwrap_err();
            assert!(matches!(err, RetryError::Exhausted { attempts: 4, .. }));
            assert_eq!(kinds.0.lock().unwrap().len(), 1);
        }
    }
}
