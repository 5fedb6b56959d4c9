//! JSON page repository document model.
//!
//! ```json
//! { "pages": [ { "name": "LoginPage", "platform": "web",
//!     "elements": [ { "elementName": "submitButton",
//!                     "css": "button[type=submit]", "text": "Submit" } ] } ] }
//! ```
//!
//! Every element key other than `elementName` is a selector type key.
//! Unknown keys are ignored; non-string or blank selector values are
//! dropped at load.

use crate::platform::{Platform, UiFramework};
use crate::result::{PagebookError, PagebookResult};
use crate::selector::SelectorType;
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// Key naming an element in canonical documents
pub const ELEMENT_NAME_KEY: &str = "elementName";

/// Root of a page repository
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRepositoryDocument {
    /// Pages in declaration order
    #[serde(default)]
    pub pages: Vec<PageEntry>,
}

/// One page and the elements on it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageEntry {
    /// Page name
    pub name: String,
    /// Raw platform tag, validated when routed
    pub platform: String,
    /// Elements in declaration order
    #[serde(default)]
    pub elements: Vec<ElementEntry>,
}

/// One named element and its selector strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementEntry {
    /// Element name, unique within its page
    pub name: String,
    selectors: BTreeMap<SelectorType, String>,
}

impl PageRepositoryDocument {
    /// Parse a document, normalizing legacy element keys first
    pub fn from_json_value(mut value: Value) -> PagebookResult<Self> {
        let normalized = normalize_legacy(&mut value);
        if normalized > 0 {
            info!(normalized, "normalized legacy element entries");
        }
        let document = match value.get_mut("pages").and_then(Value::as_array_mut) {
            Some(pages) => Self {
                pages: pages
                    .drain(..)
                    .enumerate()
                    .map(|(index, raw)| parse_page(index, raw))
                    .collect::<PagebookResult<_>>()?,
            },
            None => serde_json::from_value(value)?,
        };
        debug!(pages = document.pages.len(), "page repository parsed");
        Ok(document)
    }

    /// Parse JSON text
    pub fn from_json_str(json: &str) -> PagebookResult<Self> {
        Self::from_json_value(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON file
    pub fn load(path: impl AsRef<Path>) -> PagebookResult<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading page repository");
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Pretty JSON in the canonical schema
    pub fn to_json_pretty(&self) -> PagebookResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// First page with this exact name
    #[must_use]
    pub fn page(&self, name: &str) -> Option<&PageEntry> {
        self.pages.iter().find(|p| p.name == name)
    }

    /// Page names in declaration order
    pub fn page_names(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().map(|p| p.name.as_str())
    }

    /// Structural problems in the document
    #[must_use]
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        let mut pages_seen = HashSet::new();

        for page in &self.pages {
            if !pages_seen.insert(page.name.as_str()) {
                out.push(Diagnostic::error(DiagnosticKind::DuplicatePage {
                    page: page.name.clone(),
                }));
            }

            let platform = match page.platform() {
                Ok(p) => Some(p),
                Err(_) => {
                    out.push(Diagnostic::error(DiagnosticKind::UnknownPlatform {
                        page: page.name.clone(),
                        tag: page.platform.clone(),
                    }));
                    None
                }
            };

            if page.elements.is_empty() {
                out.push(Diagnostic::warning(DiagnosticKind::EmptyPage {
                    page: page.name.clone(),
                }));
            }

            let mut elements_seen = HashSet::new();
            for element in &page.elements {
                if !elements_seen.insert(element.name.as_str()) {
                    out.push(Diagnostic::error(DiagnosticKind::DuplicateElement {
                        page: page.name.clone(),
                        element: element.name.clone(),
                    }));
                }
                out.extend(element_diagnostics(page, element, platform));
            }
        }
        out
    }
}

fn element_diagnostics(
    page: &PageEntry,
    element: &ElementEntry,
    platform: Option<Platform>,
) -> Vec<Diagnostic> {
    let no_usable = || {
        Diagnostic::error(DiagnosticKind::NoUsableSelectors {
            page: page.name.clone(),
            element: element.name.clone(),
        })
    };
    if !element.has_selectors() {
        return vec![no_usable()];
    }
    let Some(platform) = platform else {
        return Vec::new();
    };
    let unsupported: Vec<SelectorType> = element
        .selector_types()
        .filter(|t| !t.supports(platform))
        .collect();
    if unsupported.len() == element.len() {
        return vec![no_usable()];
    }
    unsupported
        .into_iter()
        .map(|selector| {
            Diagnostic::warning(DiagnosticKind::UnsupportedSelector {
                page: page.name.clone(),
                element: element.name.clone(),
                selector,
                platform,
            })
        })
        .collect()
}

fn parse_page(index: usize, raw: Value) -> PagebookResult<PageEntry> {
    let page = raw
        .get("name")
        .and_then(Value::as_str)
        .map_or_else(|| format!("#{index}"), ToString::to_string);
    PageEntry::deserialize(raw).map_err(|e| PagebookError::MalformedPage {
        page,
        message: e.to_string(),
    })
}

/// Rewrite legacy element keys in place; returns the number of elements touched
fn normalize_legacy(value: &mut Value) -> usize {
    let Some(pages) = value.get_mut("pages").and_then(Value::as_array_mut) else {
        return 0;
    };
    let mut count = 0;
    for page in pages {
        let Some(elements) = page.get_mut("elements").and_then(Value::as_array_mut) else {
            continue;
        };
        for element in elements.iter_mut().filter_map(Value::as_object_mut) {
            let mut touched = false;
            if !element.contains_key(ELEMENT_NAME_KEY) {
                if let Some(name) = element.remove("name") {
                    element.insert(ELEMENT_NAME_KEY.to_string(), name);
                    touched = true;
                }
            }
            if !element.contains_key("className") {
                if let Some(class) = element.remove("class") {
                    element.insert("className".to_string(), class);
                    touched = true;
                }
            }
            if touched {
                count += 1;
            }
        }
    }
    count
}

impl PageEntry {
    /// Create an empty page
    #[must_use]
    pub fn new(name: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            platform: platform.into(),
            elements: Vec::new(),
        }
    }

    /// Add an element
    #[must_use]
    pub fn with_element(mut self, element: ElementEntry) -> Self {
        self.elements.push(element);
        self
    }

    /// Validated platform
    pub fn platform(&self) -> PagebookResult<Platform> {
        self.platform.parse()
    }

    /// UI framework named by the platform tag
    pub fn framework(&self) -> PagebookResult<UiFramework> {
        self.platform.parse()
    }

    /// First element with this exact name
    #[must_use]
    pub fn element(&self, name: &str) -> Option<&ElementEntry> {
        self.elements.iter().find(|e| e.name == name)
    }
}

impl ElementEntry {
    /// Create an element with no selectors
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            selectors: BTreeMap::new(),
        }
    }

    /// Set a selector string; blank values are ignored
    #[must_use]
    pub fn with_selector(mut self, kind: SelectorType, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.trim().is_empty() {
            self.selectors.insert(kind, value);
        }
        self
    }

    /// Raw selector string for a strategy
    #[must_use]
    pub fn selector(&self, kind: SelectorType) -> Option<&str> {
        self.selectors.get(&kind).map(String::as_str)
    }

    /// Declared strategies in canonical order
    pub fn selector_types(&self) -> impl Iterator<Item = SelectorType> + '_ {
        self.selectors.keys().copied()
    }

    /// Declared strategies with their raw values
    pub fn selectors(&self) -> impl Iterator<Item = (SelectorType, &str)> {
        self.selectors.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Number of declared strategies
    #[must_use]
    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    /// Whether any strategy is declared
    #[must_use]
    pub fn has_selectors(&self) -> bool {
        !self.selectors.is_empty()
    }

    fn from_raw(raw: BTreeMap<String, Value>) -> Result<Self, String> {
        let name = match raw.get(ELEMENT_NAME_KEY) {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            Some(other) => return Err(format!("invalid {ELEMENT_NAME_KEY}: {other}")),
            None => return Err(format!("missing {ELEMENT_NAME_KEY}")),
        };
        let mut entry = Self::new(name);
        for (key, value) in raw {
            if key == ELEMENT_NAME_KEY {
                continue;
            }
            let Some(kind) = SelectorType::from_key(&key) else {
                debug!(element = %entry.name, key = %key, "ignoring unknown element key");
                continue;
            };
            match value {
                Value::String(s) if !s.trim().is_empty() => {
                    entry.selectors.insert(kind, s);
                }
                other => {
                    debug!(element = %entry.name, selector = %kind, value = %other, "dropping malformed selector value");
                }
            }
        }
        Ok(entry)
    }
}

impl<'de> Deserialize<'de> for ElementEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
        Self::from_raw(raw).map_err(de::Error::custom)
    }
}

impl Serialize for ElementEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.selectors.len() + 1))?;
        map.serialize_entry(ELEMENT_NAME_KEY, &self.name)?;
        for (kind, value) in &self.selectors {
            map.serialize_entry(kind.key(), value)?;
        }
        map.end()
    }
}

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Usable but suspicious
    Warning,
    /// Resolution will fail or be ambiguous
    Error,
}

/// What is wrong
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Two pages share a name; the first wins
    DuplicatePage {
        /// Page name
        page: String,
    },
    /// Two elements on one page share a name; the first wins
    DuplicateElement {
        /// Page name
        page: String,
        /// Element name
        element: String,
    },
    /// Element has no selector its page's platform can evaluate
    NoUsableSelectors {
        /// Page name
        page: String,
        /// Element name
        element: String,
    },
    /// Page platform tag is not recognized
    UnknownPlatform {
        /// Page name
        page: String,
        /// Raw tag
        tag: String,
    },
    /// Page declares no elements
    EmptyPage {
        /// Page name
        page: String,
    },
    /// Selector type the page's platform cannot evaluate
    UnsupportedSelector {
        /// Page name
        page: String,
        /// Element name
        element: String,
        /// Strategy
        selector: SelectorType,
        /// Page platform
        platform: Platform,
    },
}

/// One document problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Severity
    pub severity: Severity,
    /// Problem
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    const fn error(kind: DiagnosticKind) -> Self {
        Self {
            severity: Severity::Error,
            kind,
        }
    }

    const fn warning(kind: DiagnosticKind) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
        }
    }

    /// Whether this is an error
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{level}: ")?;
        match &self.kind {
            DiagnosticKind::DuplicatePage { page } => {
                write!(f, "duplicate page '{page}' (first declaration wins)")
            }
            DiagnosticKind::DuplicateElement { page, element } => {
                write!(f, "duplicate element '{element}' on page '{page}' (first declaration wins)")
            }
            DiagnosticKind::NoUsableSelectors { page, element } => {
                write!(f, "element '{element}' on page '{page}' has no usable selectors")
            }
            DiagnosticKind::UnknownPlatform { page, tag } => {
                write!(f, "page '{page}' has unknown platform tag '{tag}'")
            }
            DiagnosticKind::EmptyPage { page } => write!(f, "page '{page}' declares no elements"),
            DiagnosticKind::UnsupportedSelector {
                page,
                element,
                selector,
                platform,
            } => write!(
                f,
                "element '{element}' on page '{page}' declares '{selector}', which {platform} sessions cannot evaluate"
            ),
        }
    }
}
