//! `pagebook validate`

use crate::commands::ValidateArgs;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::Reporter;
use pagebook::{Diagnostic, PageRepositoryDocument};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Outcome of validating one repository file
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// File that was checked
    pub file: PathBuf,
    /// Number of pages
    pub pages: usize,
    /// Number of elements across all pages
    pub elements: usize,
    /// Error count
    pub errors: usize,
    /// Warning count
    pub warnings: usize,
    /// Every diagnostic in document order
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    /// Check a parsed document
    #[must_use]
    pub fn new(file: &Path, document: &PageRepositoryDocument) -> Self {
        let diagnostics = document.diagnostics();
        let errors = diagnostics.iter().filter(|d| d.is_error()).count();
        Self {
            file: file.to_path_buf(),
            pages: document.pages.len(),
            elements: document.pages.iter().map(|p| p.elements.len()).sum(),
            errors,
            warnings: diagnostics.len() - errors,
            diagnostics,
        }
    }

    /// Whether the file passes; warnings count unless allowed
    #[must_use]
    pub const fn passes(&self, allow_warnings: bool) -> bool {
        self.errors == 0 && (allow_warnings || self.warnings == 0)
    }

    fn summary(&self) -> String {
        format!(
            "{}: {} pages, {} elements, {} error(s), {} warning(s)",
            self.file.display(),
            self.pages,
            self.elements,
            self.errors,
            self.warnings
        )
    }
}

/// Run the validate command
pub fn run_validate(config: &CliConfig, args: &ValidateArgs) -> CliResult<()> {
    let document = PageRepositoryDocument::load(&args.file)?;
    let report = ValidationReport::new(&args.file, &document);
    info!(
        file = %args.file.display(),
        errors = report.errors,
        warnings = report.warnings,
        "validated page repository"
    );

    let passed = report.passes(args.allow_warnings);
    let reporter = Reporter::new(config);
    if reporter.is_json() {
        reporter.json(&report)?;
    } else {
        for diagnostic in &report.diagnostics {
            reporter.diagnostic(diagnostic)?;
        }
        if passed {
            reporter.success(&report.summary())?;
        } else {
            reporter.failure(&report.summary())?;
        }
    }

    if passed {
        Ok(())
    } else {
        Err(CliError::validation(report.errors, report.warnings))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pagebook::{DiagnosticKind, ElementEntry, PageEntry, SelectorType};

    fn document() -> PageRepositoryDocument {
        PageRepositoryDocument {
            pages: vec![
                PageEntry::new("Login", "web")
                    .with_element(ElementEntry::new("user").with_selector(SelectorType::Id, "u"))
                    .with_element(
                        ElementEntry::new("submit")
                            .with_selector(SelectorType::Css, "#s")
                            .with_selector(SelectorType::AccessibilityId, "submit"),
                    ),
                PageEntry::new("Cart", "android").with_element(
                    ElementEntry::new("checkout").with_selector(SelectorType::AccessibilityId, "c"),
                ),
            ],
        }
    }

    #[test]
    fn test_counts() {
        let report = ValidationReport::new(Path::new("pages.json"), &document());
        assert_eq!(report.pages, 2);
        assert_eq!(report.elements, 3);
        assert_eq!(report.errors, 0);
        assert_eq!(report.warnings, 1);
        assert!(matches!(
            report.diagnostics[0].kind,
            DiagnosticKind::UnsupportedSelector { .. }
        ));
    }

    #[test]
    fn test_warnings_fail_unless_allowed() {
        let report = ValidationReport::new(Path::new("pages.json"), &document());
        assert!(!report.passes(false));
        assert!(report.passes(true));
    }

    #[test]
    fn test_errors_always_fail() {
        let mut doc = document();
        doc.pages.push(PageEntry::new("Login", "web"));
        let report = ValidationReport::new(Path::new("pages.json"), &doc);
        assert!(report.errors >= 1);
        assert!(!report.passes(true));
    }

    #[test]
    fn test_summary_line() {
        let report = ValidationReport::new(Path::new("pages.json"), &document());
        assert_eq!(
            report.summary(),
            "pages.json: 2 pages, 3 elements, 0 error(s), 1 warning(s)"
        );
    }
}
