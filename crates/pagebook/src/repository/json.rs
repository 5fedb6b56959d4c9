//! Element repository backed by a JSON page document.

use super::document::{ElementEntry, PageEntry, PageRepositoryDocument};
use super::ElementRepository;
use crate::config::{PagebookConfig, TextStrategyConfig};
use crate::handle::{no_live_match, ElementHandle};
use crate::locator::CompoundLocator;
use crate::platform::{Platform, UiFramework};
use crate::result::{NotFoundReason, PagebookError, PagebookResult};
use crate::router::DriverRouter;
use crate::selector::{Selector, SelectorType, TextStrategy};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Resolves `(element, page)` pairs through a parsed page document
#[derive(Debug, Clone)]
pub struct JsonPageRepository {
    document: Arc<PageRepositoryDocument>,
    router: DriverRouter,
    text_strategy: TextStrategyConfig,
    default_types: Vec<SelectorType>,
}

impl JsonPageRepository {
    /// Create a repository over a parsed document
    #[must_use]
    pub fn new(document: PageRepositoryDocument, router: DriverRouter) -> Self {
        Self {
            document: Arc::new(document),
            router,
            text_strategy: TextStrategyConfig::default(),
            default_types: Vec::new(),
        }
    }

    /// Load the document from a JSON file
    pub fn from_path(path: impl AsRef<Path>, router: DriverRouter) -> PagebookResult<Self> {
        Ok(Self::new(PageRepositoryDocument::load(path)?, router))
    }

    /// Load the document named by a config, applying its selector settings
    pub fn from_config(config: &PagebookConfig, router: DriverRouter) -> PagebookResult<Self> {
        let path = config
            .repository
            .as_ref()
            .ok_or_else(|| PagebookError::config("no repository path configured"))?;
        Ok(Self::from_path(path, router)?
            .with_text_strategies(config.text_strategy)
            .with_default_types(config.selector_types.clone()))
    }

    /// Replace the text strategy for one UI framework
    #[must_use]
    pub fn with_text_strategy(mut self, framework: UiFramework, strategy: TextStrategy) -> Self {
        self.text_strategy.set(framework, strategy);
        self
    }

    /// Replace all text strategies
    #[must_use]
    pub const fn with_text_strategies(mut self, strategies: TextStrategyConfig) -> Self {
        self.text_strategy = strategies;
        self
    }

    /// Types used when a caller requests none (empty = all)
    #[must_use]
    pub fn with_default_types(mut self, types: Vec<SelectorType>) -> Self {
        self.default_types = types;
        self
    }

    /// Parsed document
    #[must_use]
    pub fn document(&self) -> &PageRepositoryDocument {
        &self.document
    }

    /// Driver router
    #[must_use]
    pub const fn router(&self) -> &DriverRouter {
        &self.router
    }

    /// Page entry by exact name
    pub fn page_entry(&self, page: &str) -> PagebookResult<&PageEntry> {
        self.document
            .page(page)
            .ok_or_else(|| PagebookError::PageNotFound {
                page: page.to_string(),
            })
    }

    /// Element entry by exact name, `None` when undeclared
    #[must_use]
    pub fn find_element_entry<'a>(
        &self,
        element: &str,
        page: &'a PageEntry,
    ) -> Option<&'a ElementEntry> {
        page.element(element)
    }

    /// Element entry by exact name
    pub fn element_entry<'a>(
        &self,
        element: &str,
        page: &'a PageEntry,
    ) -> PagebookResult<&'a ElementEntry> {
        self.find_element_entry(element, page)
            .ok_or_else(|| PagebookError::ElementNotFound {
                element: element.to_string(),
                page: page.name.clone(),
                reason: NotFoundReason::NotDeclared,
            })
    }

    /// Build the OR-locator for the requested selector types. An empty
    /// request uses the configured defaults, or every type.
    pub fn compound_locator(
        &self,
        element: &ElementEntry,
        page: &PageEntry,
        requested: &[SelectorType],
    ) -> PagebookResult<CompoundLocator> {
        let types: &[SelectorType] = if !requested.is_empty() {
            requested
        } else if !self.default_types.is_empty() {
            &self.default_types
        } else {
            &SelectorType::ALL
        };

        let mut locator = CompoundLocator::new().with_origin(&page.name, &element.name);
        for kind in types {
            let Some(raw) = element.selector(*kind) else {
                continue;
            };
            let selector = if *kind == SelectorType::Text {
                self.text_strategy.for_framework(page.framework()?).compile(raw)
            } else {
                Selector::new(*kind, raw)
            };
            locator.push(selector);
        }

        if locator.is_empty() {
            return Err(PagebookError::EmptyCompoundLocator {
                element: element.name.clone(),
                page: page.name.clone(),
                requested: types.iter().map(|t| t.key().to_string()).collect(),
            });
        }
        Ok(locator)
    }

    /// First live match for a locator on the page's session
    pub async fn resolve_one(
        &self,
        page: &PageEntry,
        element: &ElementEntry,
        locator: &CompoundLocator,
    ) -> PagebookResult<ElementHandle> {
        let session = self.router.route_for_tag(&page.platform)?;
        debug!(page = %page.name, element = %element.name, platform = %session.platform(), "resolving element");
        let found = session
            .find_one(locator)
            .await?
            .ok_or_else(|| no_live_match(locator))?;
        Ok(ElementHandle::resolved(found, session))
    }

    /// All live matches; empty is not an error
    pub async fn resolve_many(
        &self,
        page: &PageEntry,
        element: &ElementEntry,
        locator: &CompoundLocator,
    ) -> PagebookResult<Vec<ElementHandle>> {
        let session = self.router.route_for_tag(&page.platform)?;
        let found = session.find_all(locator).await?;
        debug!(page = %page.name, element = %element.name, matches = found.len(), "resolved element list");
        Ok(found
            .into_iter()
            .map(|el| ElementHandle::resolved(el, session.clone()))
            .collect())
    }

    /// Resolve one element using only the given selector types
    pub async fn find_element(
        &self,
        element: &str,
        page: &str,
        types: &[SelectorType],
    ) -> PagebookResult<ElementHandle> {
        let page = self.page_entry(page)?;
        let entry = self.element_entry(element, page)?;
        let locator = self.compound_locator(entry, page, types)?;
        self.resolve_one(page, entry, &locator).await
    }

    /// Resolve all matches using only the given selector types
    pub async fn find_elements(
        &self,
        element: &str,
        page: &str,
        types: &[SelectorType],
    ) -> PagebookResult<Vec<ElementHandle>> {
        let page = self.page_entry(page)?;
        let entry = self.element_entry(element, page)?;
        let locator = self.compound_locator(entry, page, types)?;
        self.resolve_many(page, entry, &locator).await
    }

    /// Handle that queries the driver on first use
    pub fn lazy_element(&self, element: &str, page: &str) -> PagebookResult<ElementHandle> {
        let page = self.page_entry(page)?;
        let entry = self.element_entry(element, page)?;
        let locator = self.compound_locator(entry, page, &[])?;
        let session = self.router.route_for_tag(&page.platform)?;
        Ok(ElementHandle::unresolved(locator, session))
    }
}

#[async_trait]
impl ElementRepository for JsonPageRepository {
    async fn element(&self, element: &str, page: &str) -> PagebookResult<ElementHandle> {
        self.find_element(element, page, &[]).await
    }

    async fn elements(&self, list: &str, page: &str) -> PagebookResult<Vec<ElementHandle>> {
        self.find_elements(list, page, &[]).await
    }

    fn platform_of(&self, page: &str) -> PagebookResult<Platform> {
        self.page_entry(page)?.platform()
    }
}
