//! Pagebook CLI: inspect and validate JSON page repositories
//!
//! ## Usage
//!
//! ```bash
//! pagebook validate pages.json                      # Check for duplicates and unusable elements
//! pagebook pages pages.json                         # List pages
//! pagebook locator pages.json --page Login --element submit --types css,xpath
//! pagebook normalize legacy.json -o pages.json      # Rewrite into the canonical schema
//! ```

use clap::Parser;
use pagebook_cli::{logging, run, Cli, CliConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = CliConfig::from_cli(&cli);
    logging::init(config.verbosity, config.log_format);

    match run(&config, &cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
