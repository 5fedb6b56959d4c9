//! Result and error types for pagebook.

use thiserror::Error;

/// Result type for pagebook operations
pub type PagebookResult<T> = Result<T, PagebookError>;

/// Boxed error returned by page-object factories
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Why an element could not be produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFoundReason {
    /// The page declares no element with that name
    NotDeclared,
    /// The element is declared but the driver reported zero matches
    NoLiveMatch {
        /// Rendered compound locator that was queried
        locator: String,
    },
}

impl std::fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotDeclared => f.write_str("not declared in the repository"),
            Self::NoLiveMatch { locator } => write!(f, "no live match for {locator}"),
        }
    }
}

/// Errors that can occur in pagebook
#[derive(Debug, Error)]
pub enum PagebookError {
    /// Page name absent from the repository
    #[error("Page '{page}' not found in repository")]
    PageNotFound {
        /// Page name that was requested
        page: String,
    },

    /// Element absent from a page, or zero live matches for it
    #[error("Element '{element}' not found on page '{page}': {reason}")]
    ElementNotFound {
        /// Element name
        element: String,
        /// Page name
        page: String,
        /// Declared-absent vs. no live match
        reason: NotFoundReason,
    },

    /// List disambiguation exhausted its timeout
    #[error(
        "No match for {criteria} among {candidates} candidates after {timeout_ms}ms \
         ({attempts} scans){}",
        .last_error.as_ref().map(|e| format!(", last error: {e}")).unwrap_or_default()
    )]
    NoMatchFound {
        /// Rendered selection criteria
        criteria: String,
        /// Number of candidates scanned
        candidates: usize,
        /// Configured timeout
        timeout_ms: u64,
        /// Number of full scans attempted
        attempts: u32,
        /// Last suppressed transient error, if any
        last_error: Option<String>,
    },

    /// Page-object factory failed
    #[error("Failed to construct page object '{page}': {source}")]
    ConstructionError {
        /// Page name
        page: String,
        /// Underlying cause
        #[source]
        source: BoxError,
    },

    /// Page object exposes no fields at all
    #[error("Page object '{page}' has no element fields; cannot look up '{field}'")]
    EmptyPageObject {
        /// Page name
        page: String,
        /// Field that was requested
        field: String,
    },

    /// Page object exists but lacks the requested field
    #[error("Field '{field}' not found on page object '{page}' among {available} fields: [{}]", .names.join(", "))]
    FieldNotFound {
        /// Field name
        field: String,
        /// Page name
        page: String,
        /// Number of fields the page declares
        available: usize,
        /// Names of the declared fields
        names: Vec<String>,
    },

    /// Single-element field requested as a list, or the reverse
    #[error("Field '{field}' on page object '{page}' is {actual}, but {expected} was requested")]
    IncompatibleField {
        /// Field name
        field: String,
        /// Page name
        page: String,
        /// Declared kind
        actual: &'static str,
        /// Requested kind
        expected: &'static str,
    },

    /// Selector type key not recognized
    #[error("Unsupported selector type: '{value}'")]
    UnsupportedSelectorType {
        /// Offending value
        value: String,
    },

    /// Platform tag not recognized
    #[error("Unsupported platform tag: '{value}'")]
    UnsupportedPlatform {
        /// Offending value
        value: String,
    },

    /// A page entry in the repository document could not be read. `page` is
    /// the page name, or `#index` when the name itself is missing.
    #[error("Malformed page '{page}' in repository: {message}")]
    MalformedPage {
        /// Page name or position
        page: String,
        /// Parser message
        message: String,
    },

    /// None of the requested selector types is defined for the element
    #[error(
        "Element '{element}' on page '{page}' defines none of the requested selector types [{}]",
        .requested.join(", ")
    )]
    EmptyCompoundLocator {
        /// Element name
        element: String,
        /// Page name
        page: String,
        /// Requested selector type keys
        requested: Vec<String>,
    },

    /// No session registered for the platform
    #[error("No driver session registered for platform '{platform}'")]
    DriverUnavailable {
        /// Platform name
        platform: String,
    },

    /// Element detached from the UI between lookup and use
    #[error("Stale element reference '{element}': {message}")]
    StaleElement {
        /// Driver element id
        element: String,
        /// Driver message
        message: String,
    },

    /// Driver query failed
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Operation timed out
    #[error("Operation timed out after {ms}ms")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl PagebookError {
    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether the error is a transient query/staleness failure that a
    /// polling caller may suppress and retry
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::StaleElement { .. }
                | Self::Driver { .. }
                | Self::Timeout { .. }
                | Self::ElementNotFound {
                    reason: NotFoundReason::NoLiveMatch { .. },
                    ..
                }
        )
    }

    /// Stable short name of the variant
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::PageNotFound { .. } => "page_not_found",
            Self::ElementNotFound { .. } => "element_not_found",
            Self::NoMatchFound { .. } => "no_match_found",
            Self::ConstructionError { .. } => "construction_error",
            Self::EmptyPageObject { .. } => "empty_page_object",
            Self::FieldNotFound { .. } => "field_not_found",
            Self::IncompatibleField { .. } => "incompatible_field",
            Self::UnsupportedSelectorType { .. } => "unsupported_selector_type",
            Self::UnsupportedPlatform { .. } => "unsupported_platform",
            Self::MalformedPage { .. } => "malformed_page",
            Self::EmptyCompoundLocator { .. } => "empty_compound_locator",
            Self::DriverUnavailable { .. } => "driver_unavailable",
            Self::StaleElement { .. } => "stale_element",
            Self::Driver { .. } => "driver",
            Self::Timeout { .. } => "timeout",
            Self::Config { .. } => "config",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
            Self::Yaml(_) => "yaml",
        }
    }
}
