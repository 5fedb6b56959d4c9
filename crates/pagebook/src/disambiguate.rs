//! Selecting one element out of a candidate list by text or attribute.
//!
//! The scan restarts from the first candidate whenever a transient driver
//! failure occurs, and repeats until a match is found or the deadline
//! passes. Ties go to the first matching candidate in iteration order.

use crate::config::DisambiguationConfig;
use crate::handle::ElementHandle;
use crate::result::{PagebookError, PagebookResult};
use crate::retry::{BoundedRetry, RetryConfig, RetryError};
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

/// What a candidate must look like to be selected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchCriteria {
    /// Visible text equals or contains the fragment, ignoring case
    Text(String),
    /// Attribute equals or contains the value, case-sensitive
    Attribute {
        /// Attribute name
        name: String,
        /// Expected value or fragment
        value: String,
    },
}

impl MatchCriteria {
    /// Text criteria
    #[must_use]
    pub fn text(fragment: impl Into<String>) -> Self {
        Self::Text(fragment.into())
    }

    /// Attribute criteria
    #[must_use]
    pub fn attribute(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Attribute {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Whether an observed value satisfies the criteria
    #[must_use]
    pub fn matches(&self, observed: &str) -> bool {
        match self {
            Self::Text(target) => {
                let observed = observed.to_lowercase();
                let target = target.to_lowercase();
                observed == target || observed.contains(&target)
            }
            Self::Attribute { value, .. } => observed == value || observed.contains(value.as_str()),
        }
    }

    async fn observe(&self, candidate: &ElementHandle) -> PagebookResult<Option<String>> {
        match self {
            Self::Text(_) => candidate.text().await.map(Some),
            Self::Attribute { name, .. } => candidate.attribute(name).await,
        }
    }
}

impl fmt::Display for MatchCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(t) => write!(f, "text '{t}'"),
            Self::Attribute { name, value } => write!(f, "attribute {name}='{value}'"),
        }
    }
}

/// Retry-bounded scanner over element lists
#[derive(Debug, Clone, Default)]
pub struct ListDisambiguator {
    config: RetryConfig,
}

impl ListDisambiguator {
    /// Create a disambiguator with the default 15s timeout
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from loaded configuration
    #[must_use]
    pub fn from_config(config: &DisambiguationConfig) -> Self {
        Self::new()
            .with_timeout(Duration::from_millis(config.timeout_ms))
            .with_poll_interval(Duration::from_millis(config.poll_interval_ms))
    }

    /// Set the overall timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the delay between scans
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    /// Get the current config
    #[must_use]
    pub const fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// First candidate whose text equals or contains `fragment`
    pub async fn by_text(
        &self,
        candidates: &[ElementHandle],
        fragment: &str,
    ) -> PagebookResult<ElementHandle> {
        self.select(candidates, &MatchCriteria::text(fragment)).await
    }

    /// First candidate whose attribute equals or contains `value`
    pub async fn by_attribute(
        &self,
        candidates: &[ElementHandle],
        name: &str,
        value: &str,
    ) -> PagebookResult<ElementHandle> {
        self.select(candidates, &MatchCriteria::attribute(name, value))
            .await
    }

    /// Scan a fixed candidate list
    pub async fn select(
        &self,
        candidates: &[ElementHandle],
        criteria: &MatchCriteria,
    ) -> PagebookResult<ElementHandle> {
        self.select_with(criteria, || async { Ok(candidates.to_vec()) })
            .await
    }

    /// Scan a candidate list re-fetched before every pass
    ///
    /// # Errors
    ///
    /// [`PagebookError::NoMatchFound`] once the timeout passes, or the first
    /// non-transient error raised by `fetch` or the driver.
    pub async fn select_with<F, Fut>(
        &self,
        criteria: &MatchCriteria,
        mut fetch: F,
    ) -> PagebookResult<ElementHandle>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = PagebookResult<Vec<ElementHandle>>>,
    {
        let seen = AtomicUsize::new(0);
        let retry = BoundedRetry::new(self.config).with_description(criteria.to_string());

        let result = retry
            .run(|_| {
                let candidates = fetch();
                let seen = &seen;
                async move {
                    let candidates = candidates.await?;
                    seen.store(candidates.len(), Ordering::Relaxed);
                    scan(&candidates, criteria).await
                }
            })
            .await;

        match result {
            Ok(outcome) => {
                debug!(criteria = %criteria, attempts = outcome.attempts, "candidate selected");
                Ok(outcome.value)
            }
            Err(RetryError::Fatal(err)) => Err(err),
            Err(RetryError::Exhausted {
                attempts,
                last_error,
                ..
            }) => {
                let candidates = seen.load(Ordering::Relaxed);
                warn!(criteria = %criteria, candidates, attempts, "no candidate matched before timeout");
                Err(PagebookError::NoMatchFound {
                    criteria: criteria.to_string(),
                    candidates,
                    timeout_ms: self.config.timeout.as_millis() as u64,
                    attempts,
                    last_error,
                })
            }
        }
    }
}

async fn scan(
    candidates: &[ElementHandle],
    criteria: &MatchCriteria,
) -> PagebookResult<Option<ElementHandle>> {
    for candidate in candidates {
        if let Some(observed) = criteria.observe(candidate).await? {
            if criteria.matches(&observed) {
                return Ok(Some(candidate.clone()));
            }
        }
    }
    Ok(None)
}
