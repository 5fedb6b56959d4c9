//! Runtime configuration loaded from YAML with environment overrides.

use crate::platform::UiFramework;
use crate::result::{PagebookError, PagebookResult};
use crate::retry::{DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS};
use crate::selector::{SelectorType, TextStrategy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable overriding [`PagebookConfig::repository`]
pub const ENV_REPOSITORY: &str = "PAGEBOOK_REPOSITORY";
/// Environment variable overriding [`DisambiguationConfig::timeout_ms`]
pub const ENV_TIMEOUT_MS: &str = "PAGEBOOK_TIMEOUT_MS";
/// Environment variable overriding [`DisambiguationConfig::poll_interval_ms`]
pub const ENV_POLL_INTERVAL_MS: &str = "PAGEBOOK_POLL_INTERVAL_MS";

/// List disambiguation timing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisambiguationConfig {
    /// Overall timeout in milliseconds
    pub timeout_ms: u64,
    /// Delay between scans in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for DisambiguationConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

/// Text strategy per UI framework
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStrategyConfig {
    /// Strategy for web pages
    pub web: TextStrategy,
    /// Strategy for Android pages, and for generic `mobile` tags
    pub android: TextStrategy,
    /// Strategy for iOS pages
    pub ios: TextStrategy,
}

impl Default for TextStrategyConfig {
    fn default() -> Self {
        Self {
            web: TextStrategy::default_for(UiFramework::Web),
            android: TextStrategy::default_for(UiFramework::Android),
            ios: TextStrategy::default_for(UiFramework::Ios),
        }
    }
}

impl TextStrategyConfig {
    /// Strategy for a framework
    #[must_use]
    pub const fn for_framework(&self, framework: UiFramework) -> TextStrategy {
        match framework {
            UiFramework::Web => self.web,
            UiFramework::Android => self.android,
            UiFramework::Ios => self.ios,
        }
    }

    /// Replace the strategy for one framework
    pub fn set(&mut self, framework: UiFramework, strategy: TextStrategy) {
        match framework {
            UiFramework::Web => self.web = strategy,
            UiFramework::Android => self.android = strategy,
            UiFramework::Ios => self.ios = strategy,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PagebookConfig {
    /// Path to the JSON page repository
    pub repository: Option<PathBuf>,
    /// List disambiguation timing
    pub disambiguation: DisambiguationConfig,
    /// Selector types used when none are requested (empty = all)
    pub selector_types: Vec<SelectorType>,
    /// Text strategy per UI framework
    pub text_strategy: TextStrategyConfig,
}

impl PagebookConfig {
    /// Parse YAML
    pub fn parse(yaml: &str) -> PagebookResult<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Load from a YAML file, apply environment overrides and validate
    pub fn load(path: impl AsRef<Path>) -> PagebookResult<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading config");
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&content)?;
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `PAGEBOOK_*` overrides from the process environment
    pub fn apply_env(&mut self) -> PagebookResult<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_env_from(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> PagebookResult<()> {
        if let Some(path) = lookup(ENV_REPOSITORY) {
            self.repository = Some(PathBuf::from(path));
        }
        if let Some(ms) = lookup(ENV_TIMEOUT_MS) {
            self.disambiguation.timeout_ms = parse_ms(ENV_TIMEOUT_MS, &ms)?;
        }
        if let Some(ms) = lookup(ENV_POLL_INTERVAL_MS) {
            self.disambiguation.poll_interval_ms = parse_ms(ENV_POLL_INTERVAL_MS, &ms)?;
        }
        Ok(())
    }

    /// Reject settings the resolver cannot honor
    pub fn validate(&self) -> PagebookResult<()> {
        let d = &self.disambiguation;
        if d.timeout_ms == 0 {
            return Err(PagebookError::config("disambiguation.timeout_ms must be > 0"));
        }
        if d.poll_interval_ms > d.timeout_ms {
            return Err(PagebookError::config(format!(
                "disambiguation.poll_interval_ms ({}) exceeds timeout_ms ({})",
                d.poll_interval_ms, d.timeout_ms
            )));
        }
        Ok(())
    }
}

fn parse_ms(key: &str, raw: &str) -> PagebookResult<u64> {
    raw.trim()
        .parse()
        .map_err(|_| PagebookError::config(format!("{key}: '{raw}' is not a millisecond count")))
}
