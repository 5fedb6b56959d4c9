//! Driver session boundary.
//!
//! Element acquisition consumes a live driver session through the
//! [`DriverSession`] trait and never manages its lifecycle. This allows
//! swapping implementations:
//!
//! - `CdpSession` - Chromium over CDP (feature `browser`)
//! - [`MockSession`] - In-memory node tree for unit testing
//! - Anything user-provided (e.g. an Appium client for mobile)

use crate::locator::CompoundLocator;
use crate::platform::Platform;
use crate::result::{PagebookError, PagebookResult};
use crate::selector::{Selector, SelectorType};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Opaque reference to a node inside one driver session
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ElementRef {
    /// Driver-assigned element id
    pub id: String,
    /// Tag or widget class name
    pub tag_name: String,
}

impl ElementRef {
    /// Create an element reference
    #[must_use]
    pub fn new(id: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag_name: tag_name.into(),
        }
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}#{}>", self.tag_name, self.id)
    }
}

/// A live driver session capable of querying UI nodes
#[async_trait]
pub trait DriverSession: Send + Sync + fmt::Debug {
    /// Stable id of the session
    fn session_id(&self) -> &str;

    /// Platform this session drives
    fn platform(&self) -> Platform;

    /// All nodes matching any selector of the locator, in document order
    async fn find_all(&self, locator: &CompoundLocator) -> PagebookResult<Vec<ElementRef>>;

    /// First node matching the locator
    async fn find_one(&self, locator: &CompoundLocator) -> PagebookResult<Option<ElementRef>> {
        Ok(self.find_all(locator).await?.into_iter().next())
    }

    /// Visible text of a node
    async fn text(&self, element: &ElementRef) -> PagebookResult<String>;

    /// Attribute value of a node, `None` when unset
    async fn attribute(&self, element: &ElementRef, name: &str) -> PagebookResult<Option<String>>;
}

/// Shared session handle
pub type SessionRef = Arc<dyn DriverSession>;

/// Node in a [`MockSession`] tree
#[derive(Debug, Clone, Default)]
pub struct MockNode {
    /// Tag or widget class name
    pub tag: String,
    /// Visible text
    pub text: String,
    /// Attributes (`id`, `name`, `class`, `accessibilityId`, ...)
    pub attributes: BTreeMap<String, String>,
    /// Selectors this node answers to beyond the derived ones
    pub aliases: Vec<Selector>,
}

impl MockNode {
    /// Create a node with a tag
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Set visible text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Make the node match a selector verbatim
    #[must_use]
    pub fn matching(mut self, selector: Selector) -> Self {
        self.aliases.push(selector);
        self
    }

    fn has_class(&self, class: &str) -> bool {
        self.attributes
            .get("class")
            .is_some_and(|c| c.split_whitespace().any(|c| c == class))
    }

    fn attr_is(&self, name: &str, value: &str) -> bool {
        self.attributes.get(name).is_some_and(|v| v == value)
    }

    /// Whether a single selector matches this node
    #[must_use]
    pub fn matches(&self, selector: &Selector) -> bool {
        if self.aliases.contains(selector) {
            return true;
        }
        if let Some(text) = selector.source_text() {
            return self.text.trim() == text;
        }
        let value = selector.value();
        match selector.kind() {
            SelectorType::Id => self.attr_is("id", value),
            SelectorType::Name => self.attr_is("name", value),
            SelectorType::TagName => self.tag.eq_ignore_ascii_case(value),
            SelectorType::ClassName => self.has_class(value),
            SelectorType::AccessibilityId => {
                self.attr_is("accessibilityId", value) || self.attr_is("content-desc", value)
            }
            SelectorType::Text => self.text.trim() == value,
            SelectorType::Css => self.matches_simple_css(value),
            _ => false,
        }
    }

    /// `#id`, `.class`, `tag`, `tag.class` and `[attr=value]` forms only
    fn matches_simple_css(&self, css: &str) -> bool {
        let css = css.trim();
        if let Some(id) = css.strip_prefix('#') {
            return self.attr_is("id", id);
        }
        if let Some(inner) = css.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            return inner.split_once('=').is_some_and(|(name, value)| {
                self.attr_is(name.trim(), value.trim().trim_matches(['"', '\'']))
            });
        }
        let mut parts = css.split('.');
        let tag = parts.next().unwrap_or_default();
        if !tag.is_empty() && !self.tag.eq_ignore_ascii_case(tag) {
            return false;
        }
        let mut classes = parts.peekable();
        if tag.is_empty() && classes.peek().is_none() {
            return false;
        }
        classes.all(|class| self.has_class(class))
    }
}

/// Failure injected into the next mock call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedFailure {
    /// Generic driver error
    Driver,
    /// Stale element reference
    Stale,
    /// Driver-side timeout
    Timeout,
}

#[derive(Debug, Default)]
struct MockState {
    nodes: Vec<(String, MockNode)>,
    detached: Vec<String>,
    failures: VecDeque<InjectedFailure>,
    call_history: Vec<String>,
    next_id: usize,
}

/// In-memory driver session for unit testing
#[derive(Debug)]
pub struct MockSession {
    session_id: String,
    platform: Platform,
    state: Mutex<MockState>,
}

impl MockSession {
    /// Create an empty mock session
    #[must_use]
    pub fn new(platform: Platform) -> Self {
        Self {
            session_id: format!("mock-{}", uuid::Uuid::new_v4()),
            platform,
            state: Mutex::new(MockState::default()),
        }
    }

    /// Create an empty web session
    #[must_use]
    pub fn web() -> Self {
        Self::new(Platform::Web)
    }

    /// Create an empty mobile session
    #[must_use]
    pub fn mobile() -> Self {
        Self::new(Platform::Mobile)
    }

    /// Use a fixed session id
    #[must_use]
    pub fn with_session_id(mut self, id: impl Into<String>) -> Self {
        self.session_id = id.into();
        self
    }

    /// Add a node builder-style
    #[must_use]
    pub fn with_node(self, node: MockNode) -> Self {
        self.add_node(node);
        self
    }

    /// Wrap in a shared handle
    #[must_use]
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a node, returning its element reference
    pub fn add_node(&self, node: MockNode) -> ElementRef {
        let mut state = self.state();
        state.next_id += 1;
        let id = format!("node-{}", state.next_id);
        let element = ElementRef::new(id.clone(), node.tag.clone());
        state.nodes.push((id, node));
        element
    }

    /// Replace the text of a node
    pub fn set_text(&self, element: &ElementRef, text: impl Into<String>) {
        let mut state = self.state();
        if let Some((_, node)) = state.nodes.iter_mut().find(|(id, _)| *id == element.id) {
            node.text = text.into();
        }
    }

    /// Remove a node; later reads through old references go stale
    pub fn detach(&self, element: &ElementRef) {
        let mut state = self.state();
        state.nodes.retain(|(id, _)| *id != element.id);
        state.detached.push(element.id.clone());
    }

    /// Fail the next `n` calls with a driver error
    pub fn fail_next(&self, n: usize) {
        self.fail_next_with(InjectedFailure::Driver, n);
    }

    /// Fail the next `n` calls with the given failure
    pub fn fail_next_with(&self, failure: InjectedFailure, n: usize) {
        let mut state = self.state();
        state.failures.extend(std::iter::repeat(failure).take(n));
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state().call_history.clone()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.state()
            .call_history
            .iter()
            .any(|c| c.starts_with(method))
    }

    /// Number of calls to a method
    #[must_use]
    pub fn call_count(&self, method: &str) -> usize {
        self.state()
            .call_history
            .iter()
            .filter(|c| c.starts_with(method))
            .count()
    }

    fn begin(&self, call: String) -> PagebookResult<MutexGuard<'_, MockState>> {
        let mut state = self.state();
        state.call_history.push(call);
        match state.failures.pop_front() {
            None => Ok(state),
            Some(InjectedFailure::Driver) => Err(PagebookError::driver("injected driver failure")),
            Some(InjectedFailure::Timeout) => Err(PagebookError::Timeout { ms: 0 }),
            Some(InjectedFailure::Stale) => Err(PagebookError::StaleElement {
                element: "<injected>".to_string(),
                message: "injected stale reference".to_string(),
            }),
        }
    }

    fn node<'a>(state: &'a MockState, element: &ElementRef) -> PagebookResult<&'a MockNode> {
        state
            .nodes
            .iter()
            .find(|(id, _)| *id == element.id)
            .map(|(_, node)| node)
            .ok_or_else(|| PagebookError::StaleElement {
                element: element.id.clone(),
                message: if state.detached.contains(&element.id) {
                    "element is no longer attached".to_string()
                } else {
                    "unknown element".to_string()
                },
            })
    }
}

#[async_trait]
impl DriverSession for MockSession {
    fn session_id(&self) -> &str {
        &self.session_id
    }

    fn platform(&self) -> Platform {
        self.platform
    }

    async fn find_all(&self, locator: &CompoundLocator) -> PagebookResult<Vec<ElementRef>> {
        let state = self.begin(format!("find_all:{locator}"))?;
        Ok(state
            .nodes
            .iter()
            .filter(|(_, node)| locator.selectors().iter().any(|s| node.matches(s)))
            .map(|(id, node)| ElementRef::new(id.clone(), node.tag.clone()))
            .collect())
    }

    async fn find_one(&self, locator: &CompoundLocator) -> PagebookResult<Option<ElementRef>> {
        let state = self.begin(format!("find_one:{locator}"))?;
        Ok(state
            .nodes
            .iter()
            .find(|(_, node)| locator.selectors().iter().any(|s| node.matches(s)))
            .map(|(id, node)| ElementRef::new(id.clone(), node.tag.clone())))
    }

    async fn text(&self, element: &ElementRef) -> PagebookResult<String> {
        let state = self.begin(format!("text:{}", element.id))?;
        Ok(Self::node(&state, element)?.text.clone())
    }

    async fn attribute(&self, element: &ElementRef, name: &str) -> PagebookResult<Option<String>> {
        let state = self.begin(format!("attribute:{}:{name}", element.id))?;
        Ok(Self::node(&state, element)?.attributes.get(name).cloned())
    }
}
