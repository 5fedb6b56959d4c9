//! Page-object backend.
//!
//! Page types implement [`PageObject`] (usually via `#[derive(PageObject)]`)
//! and are registered under a name in a [`PageObjectRegistry`]. Lookup keys
//! ignore case, `_`, `-` and whitespace, so `loginPage`, `login_page` and
//! `LoginPage` all name the same page.

use super::ElementRepository;
use crate::handle::ElementHandle;
use crate::locator::CompoundLocator;
use crate::platform::Platform;
use crate::result::{BoxError, PagebookError, PagebookResult};
use crate::router::DriverRouter;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Shape of a page-object field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// One element
    Element,
    /// A list of elements
    ElementList,
}

impl FieldKind {
    /// Human-readable description
    #[must_use]
    pub const fn describe(&self) -> &'static str {
        match self {
            Self::Element => "a single element",
            Self::ElementList => "an element list",
        }
    }
}

/// A named locator exposed by a page object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageField {
    /// Field name
    pub name: String,
    /// Single element or list
    pub kind: FieldKind,
    /// Locator for the field
    pub locator: CompoundLocator,
}

impl PageField {
    /// Single-element field
    #[must_use]
    pub fn element(name: impl Into<String>, locator: CompoundLocator) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Element,
            locator,
        }
    }

    /// Element-list field
    #[must_use]
    pub fn list(name: impl Into<String>, locator: CompoundLocator) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::ElementList,
            locator,
        }
    }
}

/// A page or component whose fields are element locators
///
/// # Example
///
/// ```ignore
/// #[derive(PageObject)]
/// #[page(platform = "web")]
/// struct LoginPage {
///     username: CompoundLocator,
///     #[page(list)]
///     errors: CompoundLocator,
/// }
/// ```
pub trait PageObject: Send + Sync {
    /// Page name used in diagnostics
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Platform whose session services this page
    fn platform(&self) -> Platform {
        Platform::Web
    }

    /// Element fields in declaration order
    fn fields(&self) -> Vec<PageField>;
}

/// Constructor for a registered page object
pub type PageFactory = Arc<dyn Fn() -> Result<Box<dyn PageObject>, BoxError> + Send + Sync>;

/// Types that declare a set of page objects (usually via
/// `#[derive(PageRepository)]`)
pub trait PageRepository {
    /// Add every page to a registry
    fn register_pages(registry: &mut PageObjectRegistry);

    /// Registry holding every page
    #[must_use]
    fn registry() -> PageObjectRegistry {
        let mut registry = PageObjectRegistry::new();
        Self::register_pages(&mut registry);
        registry
    }
}

struct Registration {
    key: String,
    name: String,
    factory: PageFactory,
}

/// Named page-object factories
#[derive(Default)]
pub struct PageObjectRegistry {
    pages: Vec<Registration>,
}

/// Registry key: lowercase, without `_`, `-` or whitespace
fn normalize_key(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '_' | '-') && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

impl PageObjectRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry for a page repository type
    #[must_use]
    pub fn of<R: PageRepository>() -> Self {
        R::registry()
    }

    /// Register a factory; a later registration under the same key wins
    pub fn register(&mut self, name: impl Into<String>, factory: PageFactory) {
        let name = name.into();
        let key = normalize_key(&name);
        self.pages.retain(|r| r.key != key);
        self.pages.push(Registration { key, name, factory });
    }

    /// Register a type built with `Default`
    pub fn register_default<P>(&mut self, name: impl Into<String>)
    where
        P: PageObject + Default + 'static,
    {
        self.register(
            name,
            Arc::new(|| -> Result<Box<dyn PageObject>, BoxError> { Ok(Box::new(P::default())) }),
        );
    }

    /// Register a fallible constructor
    pub fn register_with<P, E, F>(&mut self, name: impl Into<String>, factory: F)
    where
        P: PageObject + 'static,
        E: Into<BoxError>,
        F: Fn() -> Result<P, E> + Send + Sync + 'static,
    {
        self.register(
            name,
            Arc::new(move || -> Result<Box<dyn PageObject>, BoxError> {
                match factory() {
                    Ok(page) => Ok(Box::new(page)),
                    Err(err) => Err(err.into()),
                }
            }),
        );
    }

    /// Builder form of [`register_default`](Self::register_default)
    #[must_use]
    pub fn with_default<P>(mut self, name: impl Into<String>) -> Self
    where
        P: PageObject + Default + 'static,
    {
        self.register_default::<P>(name);
        self
    }

    /// Whether a page is registered under an equivalent key
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        let key = normalize_key(name);
        self.pages.iter().any(|r| r.key == key)
    }

    /// Registered names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().map(|r| r.name.as_str())
    }

    /// Number of registered pages
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Build a fresh page object
    pub fn instantiate(&self, page: &str) -> PagebookResult<Box<dyn PageObject>> {
        let key = normalize_key(page);
        let registration = self
            .pages
            .iter()
            .find(|r| r.key == key)
            .ok_or_else(|| PagebookError::PageNotFound {
                page: page.to_string(),
            })?;
        debug!(page, registered = %registration.name, "instantiating page object");
        (registration.factory)().map_err(|source| PagebookError::ConstructionError {
            page: page.to_string(),
            source,
        })
    }
}

impl fmt::Debug for PageObjectRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Element repository over registered page objects
#[derive(Debug)]
pub struct PageObjectRepository {
    registry: PageObjectRegistry,
    router: DriverRouter,
}

impl PageObjectRepository {
    /// Create a repository
    #[must_use]
    pub const fn new(registry: PageObjectRegistry, router: DriverRouter) -> Self {
        Self { registry, router }
    }

    /// Page registry
    #[must_use]
    pub const fn registry(&self) -> &PageObjectRegistry {
        &self.registry
    }

    /// Driver router
    #[must_use]
    pub const fn router(&self) -> &DriverRouter {
        &self.router
    }

    /// Instantiate the page and look up a field by exact name
    pub fn field(&self, field: &str, page: &str) -> PagebookResult<(Platform, PageField)> {
        let object = self.registry.instantiate(page)?;
        let fields = object.fields();
        if fields.is_empty() {
            return Err(PagebookError::EmptyPageObject {
                page: page.to_string(),
                field: field.to_string(),
            });
        }
        let available = fields.len();
        let names: Vec<String> = fields.iter().map(|f| f.name.clone()).collect();
        let found = fields
            .into_iter()
            .find(|f| f.name == field)
            .ok_or_else(|| PagebookError::FieldNotFound {
                field: field.to_string(),
                page: page.to_string(),
                available,
                names,
            })?;
        Ok((object.platform(), found))
    }

    fn typed_field(
        &self,
        field: &str,
        page: &str,
        expected: FieldKind,
    ) -> PagebookResult<(Platform, CompoundLocator)> {
        let (platform, found) = self.field(field, page)?;
        if found.kind != expected {
            return Err(PagebookError::IncompatibleField {
                field: field.to_string(),
                page: page.to_string(),
                actual: found.kind.describe(),
                expected: expected.describe(),
            });
        }
        let mut locator = found.locator;
        if locator.origin().is_none() {
            locator = locator.with_origin(page, field);
        }
        Ok((platform, locator))
    }

    /// Lazy handle for a single-element field
    pub fn element_handle(&self, field: &str, page: &str) -> PagebookResult<ElementHandle> {
        let (platform, locator) = self.typed_field(field, page, FieldKind::Element)?;
        let session = self.router.route(platform)?;
        Ok(ElementHandle::unresolved(locator, session))
    }

    /// Every live element of a list field
    pub async fn element_list(&self, field: &str, page: &str) -> PagebookResult<Vec<ElementHandle>> {
        let (platform, locator) = self.typed_field(field, page, FieldKind::ElementList)?;
        let session = self.router.route(platform)?;
        let found = session.find_all(&locator).await?;
        debug!(page, field, matches = found.len(), "resolved page-object list");
        Ok(found
            .into_iter()
            .map(|el| ElementHandle::resolved(el, session.clone()))
            .collect())
    }
}

#[async_trait]
impl ElementRepository for PageObjectRepository {
    async fn element(&self, element: &str, page: &str) -> PagebookResult<ElementHandle> {
        self.element_handle(element, page)
    }

    async fn elements(&self, list: &str, page: &str) -> PagebookResult<Vec<ElementHandle>> {
        self.element_list(list, page).await
    }

    fn platform_of(&self, page: &str) -> PagebookResult<Platform> {
        Ok(self.registry.instantiate(page)?.platform())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{MockNode, MockSession};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct LoginPage;

    impl PageObject for LoginPage {
        fn page_name(&self) -> &str {
            "LoginPage"
        }

        fn fields(&self) -> Vec<PageField> {
            vec![
                PageField::element("username", CompoundLocator::css("#user")),
                PageField::element("password", CompoundLocator::css("#pass")),
                PageField::list("errors", CompoundLocator::css(".error")),
            ]
        }
    }

    #[derive(Default)]
    struct Blank;

    impl PageObject for Blank {
        fn fields(&self) -> Vec<PageField> {
            Vec::new()
        }
    }

    #[derive(Default)]
    struct MenuScreen;

    impl PageObject for MenuScreen {
        fn platform(&self) -> Platform {
            Platform::Mobile
        }

        fn fields(&self) -> Vec<PageField> {
            vec![PageField::element("menu", CompoundLocator::accessibility_id("menu"))]
        }
    }

    fn registry() -> PageObjectRegistry {
        let mut registry = PageObjectRegistry::new()
            .with_default::<LoginPage>("loginPage")
            .with_default::<Blank>("blank")
            .with_default::<MenuScreen>("menu_screen");
        registry.register_with("broken", || {
            Err::<LoginPage, _>(std::io::Error::new(std::io::ErrorKind::Other, "no fixture"))
        });
        registry
    }

    fn repo() -> (PageObjectRepository, Arc<MockSession>) {
        let web = MockSession::web()
            .with_node(MockNode::new("input").with_attr("id", "user"))
            .with_node(MockNode::new("p").with_attr("class", "error").with_text("bad"))
            .with_node(MockNode::new("p").with_attr("class", "error").with_text("worse"))
            .shared();
        let router = DriverRouter::new().with_web(web.clone());
        (PageObjectRepository::new(registry(), router), web)
    }

    mod registry_tests {
        use super::*;

        #[test]
        fn test_normalize_key() {
            assert_eq!(normalize_key("loginPage"), "loginpage");
            assert_eq!(normalize_key("login_page"), "loginpage");
            assert_eq!(normalize_key("Login-Page "), "loginpage");
        }

        #[test]
        fn test_instantiate_case_insensitive() {
            let registry = registry();
            for name in ["LoginPage", "loginpage", "login_page", "LOGIN-PAGE"] {
                let page = registry.instantiate(name).unwrap();
                assert_eq!(page.page_name(), "LoginPage");
            }
            assert!(registry.contains("MenuScreen"));
        }

        #[test]
        fn test_unregistered_page() {
            let err = registry().instantiate("Checkout").err().unwrap();
            assert!(matches!(err, PagebookError::PageNotFound { ref page } if page == "Checkout"));
        }

        #[test]
        fn test_factory_failure_is_construction_error() {
            let err = registry().instantiate("Broken").err().unwrap();
            match err {
                PagebookError::ConstructionError { page, source } => {
                    assert_eq!(page, "Broken");
                    assert_eq!(source.to_string(), "no fixture");
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[test]
        fn test_fresh_instance_per_call() {
            let built = Arc::new(AtomicUsize::new(0));
            let counter = built.clone();
            let mut registry = PageObjectRegistry::new();
            registry.register_with("login", move || {
                counter.fetch_add(1, Ordering::Relaxed);
                Ok::<_, std::io::Error>(LoginPage)
            });
            registry.instantiate("login").unwrap();
            registry.instantiate("Login").unwrap();
            assert_eq!(built.load(Ordering::Relaxed), 2);
        }

        #[test]
        fn test_reregistration_replaces() {
            let mut registry = PageObjectRegistry::new().with_default::<Blank>("page");
            registry.register_default::<LoginPage>("Page");
            assert_eq!(registry.len(), 1);
            assert_eq!(registry.instantiate("page").unwrap().fields().len(), 3);
            assert_eq!(registry.names().collect::<Vec<_>>(), vec!["Page"]);
        }
    }

    mod repository_tests {
        use super::*;

        #[tokio::test]
        async fn test_element_is_lazy_and_routed() {
            let (repo, web) = repo();
            let handle = repo.element("username", "LoginPage").await.unwrap();
            assert!(!handle.is_resolved());
            assert!(web.history().is_empty());
            assert_eq!(handle.locator().unwrap().origin().unwrap().page, "LoginPage");
            assert!(handle.materialize().await.unwrap().is_resolved());
        }

        #[tokio::test]
        async fn test_element_list() {
            let (repo, _) = repo();
            let errors = repo.elements("errors", "login_page").await.unwrap();
            assert_eq!(errors.len(), 2);
            assert_eq!(errors[1].text().await.unwrap(), "worse");
        }

        #[test]
        fn test_empty_page_object() {
            let (repo, _) = repo();
            let err = repo.element_handle("anything", "Blank").unwrap_err();
            assert!(matches!(err, PagebookError::EmptyPageObject { .. }));
        }

        #[test]
        fn test_field_not_found_lists_fields() {
            let (repo, _) = repo();
            match repo.element_handle("submit", "LoginPage").unwrap_err() {
                PagebookError::FieldNotFound {
                    available, names, ..
                } => {
                    assert_eq!(available, 3);
                    assert_eq!(names, vec!["username", "password", "errors"]);
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[test]
        fn test_field_lookup_is_case_sensitive() {
            let (repo, _) = repo();
            assert!(matches!(
                repo.element_handle("Username", "LoginPage").unwrap_err(),
                PagebookError::FieldNotFound { .. }
            ));
        }

        #[tokio::test]
        async fn test_incompatible_field_kinds() {
            let (repo, _) = repo();
            let err = repo.element_list("username", "LoginPage").await.unwrap_err();
            assert!(matches!(
                err,
                PagebookError::IncompatibleField { actual: "a single element", .. }
            ));
            let err = repo.element_handle("errors", "LoginPage").unwrap_err();
            assert!(matches!(
                err,
                PagebookError::IncompatibleField { expected: "a single element", .. }
            ));
        }

        #[test]
        fn test_mobile_page_without_session() {
            let (repo, _) = repo();
            assert_eq!(repo.platform_of("MenuScreen").unwrap(), Platform::Mobile);
            let err = repo.element_handle("menu", "MenuScreen").unwrap_err();
            assert!(matches!(err, PagebookError::DriverUnavailable { .. }));
        }
    }
}
