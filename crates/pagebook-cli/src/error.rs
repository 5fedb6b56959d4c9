//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Repository has diagnostics that fail validation
    #[error("Validation failed: {errors} error(s), {warnings} warning(s)")]
    ValidationFailed {
        /// Error count
        errors: usize,
        /// Warning count
        warnings: usize,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON rendering error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Pagebook library error
    #[error("{0}")]
    Pagebook(#[from] pagebook::PagebookError),
}

impl CliError {
    /// Create a validation failure
    #[must_use]
    pub const fn validation(errors: usize, warnings: usize) -> Self {
        Self::ValidationFailed { errors, warnings }
    }

    /// Process exit code: 1 for failed validation, 2 for anything else
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::ValidationFailed { .. } => 1,
            _ => 2,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = CliError::validation(2, 1);
        assert_eq!(
            err.to_string(),
            "Validation failed: 2 error(s), 1 warning(s)"
        );
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err: CliError = io_err.into();
        assert!(cli_err.to_string().contains("I/O"));
        assert_eq!(cli_err.exit_code(), 2);
    }

    #[test]
    fn test_library_error_passes_message_through() {
        let err: CliError = pagebook::PagebookError::PageNotFound {
            page: "Nowhere".into(),
        }
        .into();
        assert_eq!(err.to_string(), "Page 'Nowhere' not found in repository");
    }
}
