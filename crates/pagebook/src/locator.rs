//! Compound locators: an OR-combination of single-strategy selectors.

use crate::selector::{Selector, SelectorType};
use serde::Serialize;
use std::fmt;

/// Logical name a locator was built for
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LocatorOrigin {
    /// Page name
    pub page: String,
    /// Element (or field) name
    pub element: String,
}

/// Ordered set of selectors; a node matches when any constituent matches
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct CompoundLocator {
    selectors: Vec<Selector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    origin: Option<LocatorOrigin>,
}

impl CompoundLocator {
    /// Create an empty locator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locator with a single CSS selector
    #[must_use]
    pub fn css(value: impl Into<String>) -> Self {
        Self::new().with_selector(Selector::css(value))
    }

    /// Locator with a single XPath selector
    #[must_use]
    pub fn xpath(value: impl Into<String>) -> Self {
        Self::new().with_selector(Selector::xpath(value))
    }

    /// Locator with a single accessibility id selector
    #[must_use]
    pub fn accessibility_id(value: impl Into<String>) -> Self {
        Self::new().with_selector(Selector::accessibility_id(value))
    }

    /// Add a selector; duplicates are ignored
    #[must_use]
    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.push(selector);
        self
    }

    /// Add a selector built from a strategy and value
    #[must_use]
    pub fn or(self, kind: SelectorType, value: impl Into<String>) -> Self {
        self.with_selector(Selector::new(kind, value))
    }

    /// Attach the page/element this locator describes
    #[must_use]
    pub fn with_origin(mut self, page: impl Into<String>, element: impl Into<String>) -> Self {
        self.origin = Some(LocatorOrigin {
            page: page.into(),
            element: element.into(),
        });
        self
    }

    /// Append a selector unless an equal one is already present
    pub fn push(&mut self, selector: Selector) {
        if !self.selectors.contains(&selector) {
            self.selectors.push(selector);
        }
    }

    /// Constituent selectors in insertion order
    #[must_use]
    pub fn selectors(&self) -> &[Selector] {
        &self.selectors
    }

    /// Diagnostic origin, if any
    #[must_use]
    pub const fn origin(&self) -> Option<&LocatorOrigin> {
        self.origin.as_ref()
    }

    /// Strategy kinds present, in order
    #[must_use]
    pub fn kinds(&self) -> Vec<SelectorType> {
        self.selectors.iter().map(Selector::kind).collect()
    }

    /// Number of constituent selectors
    #[must_use]
    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    /// Whether the locator has no selectors
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}

impl fmt::Display for CompoundLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(origin) = &self.origin {
            write!(f, "{}.{} ", origin.page, origin.element)?;
        }
        f.write_str("[")?;
        for (i, selector) in self.selectors.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{selector}")?;
        }
        f.write_str("]")
    }
}

impl From<Selector> for CompoundLocator {
    fn from(selector: Selector) -> Self {
        Self::new().with_selector(selector)
    }
}

impl FromIterator<Selector> for CompoundLocator {
    fn from_iter<I: IntoIterator<Item = Selector>>(iter: I) -> Self {
        let mut locator = Self::new();
        for selector in iter {
            locator.push(selector);
        }
        locator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_order_and_dedups() {
        let locator = CompoundLocator::css("#a")
            .or(SelectorType::XPath, "//a")
            .or(SelectorType::Css, "#a");
        assert_eq!(locator.len(), 2);
        assert_eq!(locator.kinds(), vec![SelectorType::Css, SelectorType::XPath]);
    }

    #[test]
    fn test_display_with_origin() {
        let locator = CompoundLocator::css("#a")
            .or(SelectorType::Id, "a")
            .with_origin("LoginPage", "submit");
        assert_eq!(locator.to_string(), "LoginPage.submit [css=#a | id=a]");
    }

    #[test]
    fn test_empty() {
        let locator = CompoundLocator::new();
        assert!(locator.is_empty());
        assert_eq!(locator.to_string(), "[]");
    }

    #[test]
    fn test_collect() {
        let locator: CompoundLocator = vec![Selector::id("x"), Selector::id("x"), Selector::css(".y")]
            .into_iter()
            .collect();
        assert_eq!(locator.len(), 2);
    }
}
