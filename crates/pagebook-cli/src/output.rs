//! Result rendering on stdout

use crate::commands::OutputFormat;
use crate::config::CliConfig;
use crate::error::CliResult;
use console::{Style, Term};
use pagebook::{Diagnostic, Severity};
use serde::Serialize;

/// Writes command results in the configured format
#[derive(Debug)]
pub struct Reporter {
    term: Term,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
    /// Result format
    pub format: OutputFormat,
}

impl Reporter {
    /// Reporter for a CLI configuration
    #[must_use]
    pub fn new(config: &CliConfig) -> Self {
        Self {
            term: Term::stdout(),
            use_color: config.color.should_color(),
            quiet: config.verbosity.is_quiet(),
            format: config.format,
        }
    }

    /// Whether results go out as JSON
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    fn paint(&self, text: &str, style: Style) -> String {
        if self.use_color {
            style.force_styling(true).apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Print a plain result line
    pub fn line(&self, text: &str) -> CliResult<()> {
        self.term.write_line(text)?;
        Ok(())
    }

    /// Print a heading line
    pub fn heading(&self, text: &str) -> CliResult<()> {
        self.line(&self.paint(text, Style::new().bold()))
    }

    /// Print a value as pretty JSON
    pub fn json<T: Serialize>(&self, value: &T) -> CliResult<()> {
        self.line(&serde_json::to_string_pretty(value)?)
    }

    /// Print a diagnostic; warnings are dropped in quiet mode
    pub fn diagnostic(&self, diagnostic: &Diagnostic) -> CliResult<()> {
        let style = match diagnostic.severity {
            Severity::Error => Style::new().red().bold(),
            Severity::Warning if self.quiet => return Ok(()),
            Severity::Warning => Style::new().yellow(),
        };
        self.line(&self.paint(&diagnostic.to_string(), style))
    }

    /// Print a success message unless quiet
    pub fn success(&self, message: &str) -> CliResult<()> {
        if self.quiet {
            return Ok(());
        }
        let prefix = if self.use_color {
            self.paint("✓", Style::new().green().bold())
        } else {
            "OK".to_string()
        };
        self.line(&format!("{prefix} {message}"))
    }

    /// Print a failure message, even when quiet
    pub fn failure(&self, message: &str) -> CliResult<()> {
        let prefix = if self.use_color {
            self.paint("✗", Style::new().red().bold())
        } else {
            "FAIL".to_string()
        };
        self.line(&format!("{prefix} {message}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ColorChoice, Verbosity};

    #[test]
    fn test_reporter_from_config() {
        let config = CliConfig::new()
            .with_color(ColorChoice::Never)
            .with_verbosity(Verbosity::Quiet)
            .with_format(OutputFormat::Json);
        let reporter = Reporter::new(&config);
        assert!(!reporter.use_color);
        assert!(reporter.quiet);
        assert!(reporter.is_json());
    }

    #[test]
    fn test_paint_respects_color() {
        let plain = Reporter::new(&CliConfig::new().with_color(ColorChoice::Never));
        assert_eq!(plain.paint("x", Style::new().red()), "x");

        let colored = Reporter::new(&CliConfig::new().with_color(ColorChoice::Always));
        let painted = colored.paint("x", Style::new().red());
        assert!(painted.contains('x'));
        assert!(painted.starts_with('\u{1b}'));
    }
}
