//! Pagebook: named element acquisition for browser and mobile UI tests.
//!
//! Tests refer to UI elements by `(element, page)` name. Pagebook turns
//! those names into live element handles through one of two repositories
//! and routes every query to the right driver session.
//!
//! # Architecture
//!
//! ```text
//! caller ─► ElementRepository ─► CompoundLocator ─► DriverRouter ─► DriverSession
//!            │                                                        │
//!            ├─ JsonPageRepository   (JSON page document)             ├─ MockSession
//!            └─ PageObjectRepository (registered page types)          └─ CdpSession
//!
//! element list ─► ListDisambiguator (BoundedRetry) ─► one ElementHandle
//! ```
//!
//! # Example
//!
//! ```ignore
//! use pagebook::prelude::*;
//!
//! let repo = JsonPageRepository::from_path("pages.json", router)?;
//! let submit = repo.element("submitButton", "LoginPage").await?;
//! let row = repo
//!     .element_in_list("rows", "Orders", &MatchCriteria::text("#1042"), &ListDisambiguator::new())
//!     .await?;
//! ```

#![warn(missing_docs)]

mod browser;
mod bundle;
mod config;
mod disambiguate;
mod driver;
mod handle;
mod locator;
mod platform;
mod repository;
mod result;
mod retry;
mod router;
mod selector;

pub use browser::{locator_script, ref_lookup, BrowserConfig, REF_ATTRIBUTE};
#[cfg(feature = "browser")]
pub use browser::CdpSession;
pub use bundle::{bundle_elements, ElementBundle};
pub use config::{
    DisambiguationConfig, PagebookConfig, TextStrategyConfig, ENV_POLL_INTERVAL_MS,
    ENV_REPOSITORY, ENV_TIMEOUT_MS,
};
pub use disambiguate::{ListDisambiguator, MatchCriteria};
pub use driver::{DriverSession, ElementRef, InjectedFailure, MockNode, MockSession, SessionRef};
pub use handle::ElementHandle;
pub use locator::{CompoundLocator, LocatorOrigin};
pub use platform::{Platform, UiFramework};
pub use repository::{
    Diagnostic, DiagnosticKind, ElementEntry, ElementRepository, FieldKind, JsonPageRepository,
    PageEntry, PageFactory, PageField, PageObject, PageObjectRegistry, PageObjectRepository,
    PageRepository, PageRepositoryDocument, Severity, ELEMENT_NAME_KEY,
};
pub use result::{BoxError, NotFoundReason, PagebookError, PagebookResult};
pub use retry::{
    BoundedRetry, RetryConfig, RetryError, RetryOutcome, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_TIMEOUT_MS,
};
pub use router::DriverRouter;
pub use selector::{xpath_literal, Selector, SelectorType, TextStrategy};

// Derive macros share names with the traits they implement
#[cfg(feature = "derive")]
pub use pagebook_derive::{PageObject, PageRepository};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::bundle::*;
    pub use super::config::*;
    pub use super::disambiguate::*;
    pub use super::driver::*;
    pub use super::handle::*;
    pub use super::locator::*;
    pub use super::platform::*;
    pub use super::repository::*;
    pub use super::result::*;
    pub use super::retry::*;
    pub use super::router::*;
    pub use super::selector::*;
    #[cfg(feature = "derive")]
    pub use pagebook_derive::{PageObject, PageRepository};
}
