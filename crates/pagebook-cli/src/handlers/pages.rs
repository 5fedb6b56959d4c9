//! `pagebook pages`

use crate::commands::PagesArgs;
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::Reporter;
use pagebook::PageRepositoryDocument;
use serde::Serialize;

/// One row of the page listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSummary {
    /// Page name
    pub name: String,
    /// Canonical platform, or the raw tag when unrecognized
    pub platform: String,
    /// Declared elements
    pub elements: usize,
}

/// Summarize every page in declaration order
#[must_use]
pub fn summarize(document: &PageRepositoryDocument) -> Vec<PageSummary> {
    document
        .pages
        .iter()
        .map(|page| PageSummary {
            name: page.name.clone(),
            platform: page
                .platform()
                .map_or_else(|_| format!("{}?", page.platform), |p| p.to_string()),
            elements: page.elements.len(),
        })
        .collect()
}

/// Run the pages command
pub fn run_pages(config: &CliConfig, args: &PagesArgs) -> CliResult<()> {
    let document = PageRepositoryDocument::load(&args.file)?;
    let rows = summarize(&document);
    let reporter = Reporter::new(config);
    if reporter.is_json() {
        return reporter.json(&rows);
    }

    let width = rows
        .iter()
        .map(|r| r.name.len())
        .max()
        .unwrap_or(0)
        .max("PAGE".len());
    reporter.heading(&format!("{:<width$}  {:<8}  ELEMENTS", "PAGE", "PLATFORM"))?;
    for row in &rows {
        reporter.line(&format!(
            "{:<width$}  {:<8}  {}",
            row.name, row.platform, row.elements
        ))?;
    }
    Ok(())
}
