//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use pagebook::SelectorType;
use std::path::PathBuf;

/// Pagebook: validate and inspect JSON page repositories
#[derive(Parser, Debug)]
#[command(name = "pagebook")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Log line format on stderr
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Result format on stdout
    #[arg(long, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check a page repository for duplicates and unusable elements
    Validate(ValidateArgs),

    /// List pages with platform and element count
    Pages(PagesArgs),

    /// Print the compound locator built for one element
    Locator(LocatorArgs),

    /// Rewrite a repository (including legacy keys) into the canonical schema
    Normalize(NormalizeArgs),
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Page repository JSON file
    pub file: PathBuf,

    /// Only errors fail validation
    #[arg(long)]
    pub allow_warnings: bool,
}

/// Arguments for the pages command
#[derive(Parser, Debug)]
pub struct PagesArgs {
    /// Page repository JSON file
    pub file: PathBuf,
}

/// Arguments for the locator command
#[derive(Parser, Debug)]
pub struct LocatorArgs {
    /// Page repository JSON file
    pub file: PathBuf,

    /// Page name
    #[arg(long)]
    pub page: String,

    /// Element name
    #[arg(long)]
    pub element: String,

    /// Selector types to combine (e.g. css,xpath); all when omitted
    #[arg(long, value_delimiter = ',')]
    pub types: Vec<SelectorType>,
}

/// Arguments for the normalize command
#[derive(Parser, Debug)]
pub struct NormalizeArgs {
    /// Page repository JSON file
    pub file: PathBuf,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Color argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// Log line format
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Result format
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON document
    Json,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    mod cli_tests {
        use super::*;

        #[test]
        fn test_parse_validate_command() {
            let cli = Cli::parse_from(["pagebook", "validate", "pages.json"]);
            if let Commands::Validate(args) = cli.command {
                assert_eq!(args.file, PathBuf::from("pages.json"));
                assert!(!args.allow_warnings);
            } else {
                panic!("expected Validate command");
            }
        }

        #[test]
        fn test_parse_validate_allow_warnings() {
            let cli = Cli::parse_from(["pagebook", "validate", "p.json", "--allow-warnings"]);
            if let Commands::Validate(args) = cli.command {
                assert!(args.allow_warnings);
            } else {
                panic!("expected Validate command");
            }
        }

        #[test]
        fn test_parse_locator_types() {
            let cli = Cli::parse_from([
                "pagebook",
                "locator",
                "p.json",
                "--page",
                "Login",
                "--element",
                "submit",
                "--types",
                "css,xpath",
            ]);
            if let Commands::Locator(args) = cli.command {
                assert_eq!(args.page, "Login");
                assert_eq!(args.element, "submit");
                assert_eq!(args.types, vec![SelectorType::Css, SelectorType::XPath]);
            } else {
                panic!("expected Locator command");
            }
        }

        #[test]
        fn test_parse_locator_rejects_unknown_type() {
            let result = Cli::try_parse_from([
                "pagebook",
                "locator",
                "p.json",
                "--page",
                "Login",
                "--element",
                "submit",
                "--types",
                "shadowRoot",
            ]);
            assert!(result.is_err());
        }

        #[test]
        fn test_parse_normalize_output() {
            let cli = Cli::parse_from(["pagebook", "normalize", "in.json", "-o", "out.json"]);
            if let Commands::Normalize(args) = cli.command {
                assert_eq!(args.output, Some(PathBuf::from("out.json")));
            } else {
                panic!("expected Normalize command");
            }
        }
    }

    mod global_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let cli = Cli::parse_from(["pagebook", "pages", "p.json"]);
            assert_eq!(cli.verbose, 0);
            assert!(!cli.quiet);
            assert_eq!(cli.color, ColorArg::Auto);
            assert_eq!(cli.log_format, LogFormat::Text);
            assert_eq!(cli.format, OutputFormat::Text);
        }

        #[test]
        fn test_globals_after_subcommand() {
            let cli = Cli::parse_from([
                "pagebook",
                "pages",
                "p.json",
                "-vv",
                "--format",
                "json",
                "--log-format",
                "json",
                "--color",
                "never",
            ]);
            assert_eq!(cli.verbose, 2);
            assert_eq!(cli.format, OutputFormat::Json);
            assert_eq!(cli.log_format, LogFormat::Json);
            assert_eq!(cli.color, ColorArg::Never);
        }

        #[test]
        fn test_subcommand_required() {
            assert!(Cli::try_parse_from(["pagebook"]).is_err());
        }
    }
}
