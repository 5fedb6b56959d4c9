//! Pagebook CLI Library
//!
//! Command-line tooling for pagebook JSON page repositories.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod handlers;
pub mod logging;
mod output;

pub use commands::{
    Cli, ColorArg, Commands, LocatorArgs, LogFormat, NormalizeArgs, OutputFormat, PagesArgs,
    ValidateArgs,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::Reporter;

/// Dispatch a parsed subcommand
pub fn run(config: &CliConfig, command: &Commands) -> CliResult<()> {
    match command {
        Commands::Validate(args) => handlers::run_validate(config, args),
        Commands::Pages(args) => handlers::run_pages(config, args),
        Commands::Locator(args) => handlers::run_locator(config, args),
        Commands::Normalize(args) => handlers::run_normalize(config, args),
    }
}
