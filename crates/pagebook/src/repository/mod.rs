//! Element repositories: turning `(element, page)` names into handles.
//!
//! Two backends share the [`ElementRepository`] contract:
//!
//! - [`JsonPageRepository`] - compound locators from a JSON page document
//! - [`PageObjectRepository`] - fields of registered page-object types

mod document;
mod json;
mod registry;

pub use document::{
    Diagnostic, DiagnosticKind, ElementEntry, PageEntry, PageRepositoryDocument, Severity,
    ELEMENT_NAME_KEY,
};
pub use json::JsonPageRepository;
pub use registry::{
    FieldKind, PageFactory, PageField, PageObject, PageObjectRegistry, PageObjectRepository,
    PageRepository,
};

use crate::disambiguate::{ListDisambiguator, MatchCriteria};
use crate::handle::ElementHandle;
use crate::platform::Platform;
use crate::result::PagebookResult;
use async_trait::async_trait;

/// Shared resolution contract
#[async_trait]
pub trait ElementRepository: Send + Sync {
    /// Resolve a single named element on a page
    async fn element(&self, element: &str, page: &str) -> PagebookResult<ElementHandle>;

    /// Resolve every element matched by a named list
    async fn elements(&self, list: &str, page: &str) -> PagebookResult<Vec<ElementHandle>>;

    /// Platform servicing a page
    fn platform_of(&self, page: &str) -> PagebookResult<Platform>;

    /// Pick one entry of a named list, re-fetching the list on every pass
    async fn element_in_list(
        &self,
        list: &str,
        page: &str,
        criteria: &MatchCriteria,
        disambiguator: &ListDisambiguator,
    ) -> PagebookResult<ElementHandle> {
        disambiguator
            .select_with(criteria, || self.elements(list, page))
            .await
    }
}
