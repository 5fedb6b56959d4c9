//! Selector strategies and single-strategy selectors.
//!
//! A [`SelectorType`] names one technique for locating a UI node. A
//! [`Selector`] pairs a strategy with its raw value and is the unit a
//! [`CompoundLocator`](crate::CompoundLocator) is built from.

use crate::platform::{Platform, UiFramework};
use crate::result::PagebookError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Enumerated locator strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SelectorType {
    /// `id` attribute
    #[serde(rename = "id")]
    Id,
    /// `name` attribute
    #[serde(rename = "name")]
    Name,
    /// Tag name
    #[serde(rename = "tagName")]
    TagName,
    /// Single class name
    #[serde(rename = "className")]
    ClassName,
    /// CSS selector
    #[serde(rename = "css")]
    Css,
    /// XPath expression
    #[serde(rename = "xpath")]
    XPath,
    /// Accessibility id (content-desc / accessibility identifier)
    #[serde(rename = "accessibilityId")]
    AccessibilityId,
    /// Espresso data matcher
    #[serde(rename = "androidDataMatcher")]
    AndroidDataMatcher,
    /// Espresso view matcher
    #[serde(rename = "androidViewMatcher")]
    AndroidViewMatcher,
    /// Android view tag
    #[serde(rename = "androidViewTag")]
    AndroidViewTag,
    /// UiAutomator selector
    #[serde(rename = "androidUIAutomator")]
    AndroidUiAutomator,
    /// XCUITest class chain
    #[serde(rename = "iOSClassChain")]
    IosClassChain,
    /// XCUITest NSPredicate string
    #[serde(rename = "iOSNsPredicateString")]
    IosNsPredicateString,
    /// Exact visible text, compiled through a [`TextStrategy`]
    #[serde(rename = "text")]
    Text,
}

impl SelectorType {
    /// Every known strategy, in the order compound locators are built
    pub const ALL: [Self; 14] = [
        Self::Id,
        Self::Name,
        Self::TagName,
        Self::ClassName,
        Self::Css,
        Self::XPath,
        Self::AccessibilityId,
        Self::AndroidDataMatcher,
        Self::AndroidViewMatcher,
        Self::AndroidViewTag,
        Self::AndroidUiAutomator,
        Self::IosClassChain,
        Self::IosNsPredicateString,
        Self::Text,
    ];

    /// Key used in repository documents
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::TagName => "tagName",
            Self::ClassName => "className",
            Self::Css => "css",
            Self::XPath => "xpath",
            Self::AccessibilityId => "accessibilityId",
            Self::AndroidDataMatcher => "androidDataMatcher",
            Self::AndroidViewMatcher => "androidViewMatcher",
            Self::AndroidViewTag => "androidViewTag",
            Self::AndroidUiAutomator => "androidUIAutomator",
            Self::IosClassChain => "iOSClassChain",
            Self::IosNsPredicateString => "iOSNsPredicateString",
            Self::Text => "text",
        }
    }

    /// Whether a session of the given platform can evaluate this strategy
    #[must_use]
    pub const fn supports(&self, platform: Platform) -> bool {
        match platform {
            Platform::Web => matches!(
                self,
                Self::Id
                    | Self::Name
                    | Self::TagName
                    | Self::ClassName
                    | Self::Css
                    | Self::XPath
                    | Self::Text
            ),
            Platform::Mobile => !matches!(self, Self::Css | Self::Name | Self::TagName),
        }
    }

    /// Look up a strategy by document key (exact match)
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.key() == key)
    }
}

impl fmt::Display for SelectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SelectorType {
    type Err = PagebookError;

    /// Parse a document key; falls back to a case-insensitive match
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::from_key(s)
            .or_else(|| {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|t| t.key().eq_ignore_ascii_case(s))
            })
            .ok_or_else(|| PagebookError::UnsupportedSelectorType {
                value: s.to_string(),
            })
    }
}

/// A single-strategy locator predicate
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Selector {
    kind: SelectorType,
    value: String,
    /// Raw text when this selector was synthesized from a `text` entry
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

impl Selector {
    /// Create a selector evaluated with `kind`
    #[must_use]
    pub fn new(kind: SelectorType, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            text: None,
        }
    }

    /// Create a CSS selector
    #[must_use]
    pub fn css(value: impl Into<String>) -> Self {
        Self::new(SelectorType::Css, value)
    }

    /// Create an XPath selector
    #[must_use]
    pub fn xpath(value: impl Into<String>) -> Self {
        Self::new(SelectorType::XPath, value)
    }

    /// Create an id selector
    #[must_use]
    pub fn id(value: impl Into<String>) -> Self {
        Self::new(SelectorType::Id, value)
    }

    /// Create an accessibility id selector
    #[must_use]
    pub fn accessibility_id(value: impl Into<String>) -> Self {
        Self::new(SelectorType::AccessibilityId, value)
    }

    /// Mark this selector as compiled from an exact-text entry
    #[must_use]
    pub fn from_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Strategy the driver evaluates
    #[must_use]
    pub const fn kind(&self) -> SelectorType {
        self.kind
    }

    /// Raw strategy value
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Source text for text-derived selectors
    #[must_use]
    pub fn source_text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Compile into a JavaScript expression evaluating to an array of
    /// matching DOM nodes. `None` for strategies a browser cannot evaluate.
    #[must_use]
    pub fn to_web_query(&self) -> Option<String> {
        let v = js_string(&self.value);
        let query = match self.kind {
            SelectorType::Id => format!("[document.getElementById({v})].filter(Boolean)"),
            SelectorType::Name => format!("Array.from(document.getElementsByName({v}))"),
            SelectorType::TagName => format!("Array.from(document.getElementsByTagName({v}))"),
            SelectorType::ClassName => {
                format!("Array.from(document.getElementsByClassName({v}))")
            }
            SelectorType::Css => format!("Array.from(document.querySelectorAll({v}))"),
            SelectorType::XPath => format!(
                "(() => {{ const r = document.evaluate({v}, document, null, \
                 XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null); const out = []; \
                 for (let i = 0; i < r.snapshotLength; i++) out.push(r.snapshotItem(i)); \
                 return out; }})()"
            ),
            SelectorType::Text => format!(
                "Array.from(document.querySelectorAll('*')).filter(el => \
                 Array.from(el.childNodes).some(n => n.nodeType === 3 && n.textContent.trim() === {v}))"
            ),
            _ => return None,
        };
        Some(query)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.kind, self.value)
    }
}

/// How an exact-text entry becomes a native selector for one UI framework
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextStrategy {
    /// `//*[text()='v']`: DOM text node equality
    XpathExactText,
    /// `//*[@text='v']`: Android hierarchy `text` attribute
    XpathTextAttribute,
    /// `new UiSelector().text("v")`
    AndroidUiAutomator,
    /// `label == "v" OR value == "v"`
    IosPredicate,
    /// Caller-supplied compiler
    #[serde(skip)]
    Custom(fn(&str) -> Selector),
}

impl TextStrategy {
    /// Default strategy per UI framework
    #[must_use]
    pub const fn default_for(framework: UiFramework) -> Self {
        match framework {
            UiFramework::Web => Self::XpathExactText,
            UiFramework::Android => Self::XpathTextAttribute,
            UiFramework::Ios => Self::IosPredicate,
        }
    }

    /// Compile exact text into a selector
    #[must_use]
    pub fn compile(&self, text: &str) -> Selector {
        let selector = match self {
            Self::XpathExactText => Selector::xpath(format!("//*[text()={}]", xpath_literal(text))),
            Self::XpathTextAttribute => {
                Selector::xpath(format!("//*[@text={}]", xpath_literal(text)))
            }
            Self::AndroidUiAutomator => Selector::new(
                SelectorType::AndroidUiAutomator,
                format!("new UiSelector().text({})", js_string(text)),
            ),
            Self::IosPredicate => {
                let quoted = js_string(text);
                Selector::new(
                    SelectorType::IosNsPredicateString,
                    format!("label == {quoted} OR value == {quoted}"),
                )
            }
            Self::Custom(compile) => compile(text),
        };
        selector.from_text(text)
    }
}

/// Quote a string as an XPath 1.0 literal
#[must_use]
pub fn xpath_literal(s: &str) -> String {
    if !s.contains('\'') {
        format!("'{s}'")
    } else if !s.contains('"') {
        format!("\"{s}\"")
    } else {
        let parts: Vec<String> = s.split('\'').map(|p| format!("'{p}'")).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

/// Quote a string as a JSON (and therefore JavaScript) string literal
pub(crate) fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    mod selector_type_tests {
        use super::*;

        #[test]
        fn test_keys_round_trip() {
            for t in SelectorType::ALL {
                assert_eq!(t.key().parse::<SelectorType>().unwrap(), t);
                assert_eq!(SelectorType::from_key(t.key()), Some(t));
            }
        }

        #[test]
        fn test_case_insensitive_parse() {
            assert_eq!(
                "ClassName".parse::<SelectorType>().unwrap(),
                SelectorType::ClassName
            );
            assert_eq!(
                "iosclasschain".parse::<SelectorType>().unwrap(),
                SelectorType::IosClassChain
            );
        }

        #[test]
        fn test_unknown_key_is_named_error() {
            let err = "linkText".parse::<SelectorType>().unwrap_err();
            assert!(matches!(
                err,
                PagebookError::UnsupportedSelectorType { ref value } if value == "linkText"
            ));
        }

        #[test]
        fn test_serde_uses_document_keys() {
            let json = serde_json::to_string(&SelectorType::AndroidUiAutomator).unwrap();
            assert_eq!(json, "\"androidUIAutomator\"");
            let t: SelectorType = serde_json::from_str("\"iOSNsPredicateString\"").unwrap();
            assert_eq!(t, SelectorType::IosNsPredicateString);
        }

        #[test]
        fn test_platform_support() {
            assert!(SelectorType::Css.supports(Platform::Web));
            assert!(!SelectorType::Css.supports(Platform::Mobile));
            assert!(SelectorType::AccessibilityId.supports(Platform::Mobile));
            assert!(!SelectorType::AccessibilityId.supports(Platform::Web));
            assert!(SelectorType::XPath.supports(Platform::Web));
            assert!(SelectorType::XPath.supports(Platform::Mobile));
        }
    }

    mod text_strategy_tests {
        use super::*;

        #[test]
        fn test_web_default_is_exact_text_xpath() {
            let sel = TextStrategy::default_for(UiFramework::Web).compile("Sign in");
            assert_eq!(sel.kind(), SelectorType::XPath);
            assert_eq!(sel.value(), "//*[text()='Sign in']");
            assert_eq!(sel.source_text(), Some("Sign in"));
        }

        #[test]
        fn test_android_default_uses_text_attribute() {
            let sel = TextStrategy::default_for(UiFramework::Android).compile("OK");
            assert_eq!(sel.value(), "//*[@text='OK']");
        }

        #[test]
        fn test_ios_default_uses_predicate() {
            let sel = TextStrategy::default_for(UiFramework::Ios).compile("OK");
            assert_eq!(sel.kind(), SelectorType::IosNsPredicateString);
            assert_eq!(sel.value(), "label == \"OK\" OR value == \"OK\"");
        }

        #[test]
        fn test_ui_automator_and_predicate() {
            let a = TextStrategy::AndroidUiAutomator.compile("Next");
            assert_eq!(a.kind(), SelectorType::AndroidUiAutomator);
            assert_eq!(a.value(), "new UiSelector().text(\"Next\")");

            let i = TextStrategy::IosPredicate.compile("Next");
            assert_eq!(i.value(), "label == \"Next\" OR value == \"Next\"");
        }

        #[test]
        fn test_custom_strategy() {
            fn by_label(text: &str) -> Selector {
                Selector::css(format!("[aria-label='{text}']"))
            }
            let sel = TextStrategy::Custom(by_label).compile("Close");
            assert_eq!(sel.kind(), SelectorType::Css);
            assert_eq!(sel.source_text(), Some("Close"));
        }
    }

    mod query_tests {
        use super::*;

        #[test]
        fn test_xpath_literal_quoting() {
            assert_eq!(xpath_literal("plain"), "'plain'");
            assert_eq!(xpath_literal("it's"), "\"it's\"");
            assert_eq!(
                xpath_literal("it's \"x\""),
                "concat('it', \"'\", 's \"x\"')"
            );
        }

        #[test]
        fn test_web_queries_escape_values() {
            let q = Selector::css("a[title=\"x\"]").to_web_query().unwrap();
            assert_eq!(
                q,
                "Array.from(document.querySelectorAll(\"a[title=\\\"x\\\"]\"))"
            );
            let q = Selector::id("login").to_web_query().unwrap();
            assert!(q.contains("getElementById(\"login\")"));
        }

        #[test]
        fn test_mobile_strategies_have_no_web_query() {
            assert!(Selector::accessibility_id("menu").to_web_query().is_none());
            assert!(Selector::new(SelectorType::IosClassChain, "**/XCUIElementTypeButton")
                .to_web_query()
                .is_none());
        }

        #[test]
        fn test_display() {
            assert_eq!(Selector::css("#a").to_string(), "css=#a");
        }
    }
}
