//! Command handlers

pub mod locator;
pub mod normalize;
pub mod pages;
pub mod validate;

pub use locator::{build_report, run_locator, LocatorReport, SelectorReport};
pub use normalize::run_normalize;
pub use pages::{run_pages, summarize, PageSummary};
pub use validate::{run_validate, ValidationReport};
