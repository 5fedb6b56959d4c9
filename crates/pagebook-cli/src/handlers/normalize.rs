//! `pagebook normalize`

use crate::commands::NormalizeArgs;
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::Reporter;
use pagebook::PageRepositoryDocument;
use serde_json::json;
use std::fs;

/// Run the normalize command
pub fn run_normalize(config: &CliConfig, args: &NormalizeArgs) -> CliResult<()> {
    let document = PageRepositoryDocument::load(&args.file)?;
    let canonical = document.to_json_pretty()?;
    let reporter = Reporter::new(config);

    let Some(path) = &args.output else {
        return reporter.line(&canonical);
    };
    fs::write(path, format!("{canonical}\n"))?;
    if reporter.is_json() {
        reporter.json(&json!({
            "output": path,
            "pages": document.pages.len(),
        }))
    } else {
        reporter.success(&format!(
            "wrote {} pages to {}",
            document.pages.len(),
            path.display()
        ))
    }
}
