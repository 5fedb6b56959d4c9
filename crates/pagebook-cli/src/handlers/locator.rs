//! `pagebook locator`

use crate::commands::LocatorArgs;
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::Reporter;
use pagebook::{DriverRouter, JsonPageRepository, PageRepositoryDocument, Platform, SelectorType};
use serde::Serialize;

/// One constituent selector
#[derive(Debug, Clone, Serialize)]
pub struct SelectorReport {
    /// Strategy
    pub kind: SelectorType,
    /// Native selector value
    pub value: String,
    /// Browser query, absent for mobile-only strategies
    pub web_query: Option<String>,
}

/// Compound locator built for one element
#[derive(Debug, Clone, Serialize)]
pub struct LocatorReport {
    /// Page name
    pub page: String,
    /// Element name
    pub element: String,
    /// Page platform
    pub platform: Platform,
    /// Rendered locator
    pub locator: String,
    /// Constituents in evaluation order
    pub selectors: Vec<SelectorReport>,
}

/// Build the locator the JSON repository would resolve with
pub fn build_report(
    document: PageRepositoryDocument,
    page: &str,
    element: &str,
    types: &[SelectorType],
) -> CliResult<LocatorReport> {
    let repo = JsonPageRepository::new(document, DriverRouter::new());
    let page = repo.page_entry(page)?;
    let entry = repo.element_entry(element, page)?;
    let locator = repo.compound_locator(entry, page, types)?;
    Ok(LocatorReport {
        page: page.name.clone(),
        element: entry.name.clone(),
        platform: page.platform()?,
        locator: locator.to_string(),
        selectors: locator
            .selectors()
            .iter()
            .map(|s| SelectorReport {
                kind: s.kind(),
                value: s.value().to_string(),
                web_query: s.to_web_query(),
            })
            .collect(),
    })
}

/// Run the locator command
pub fn run_locator(config: &CliConfig, args: &LocatorArgs) -> CliResult<()> {
    let document = PageRepositoryDocument::load(&args.file)?;
    let report = build_report(document, &args.page, &args.element, &args.types)?;
    let reporter = Reporter::new(config);
    if reporter.is_json() {
        return reporter.json(&report);
    }

    reporter.heading(&report.locator)?;
    for selector in &report.selectors {
        reporter.line(&format!("  {}={}", selector.kind, selector.value))?;
        match &selector.web_query {
            Some(query) => reporter.line(&format!("    web: {query}"))?,
            None => reporter.line("    web: (not evaluable in a browser)")?,
        }
    }
    Ok(())
}
