//! Chromium driver session over the Chrome `DevTools` Protocol.
//!
//! Compound locators are compiled into one JavaScript query (see
//! [`Selector::to_web_query`](crate::Selector::to_web_query)); matching
//! nodes are tagged with a `data-pagebook-ref` attribute so later reads can
//! find them again. A tag that no longer resolves is a stale element.

/// Attribute used to tag nodes returned by a query
pub const REF_ATTRIBUTE: &str = "data-pagebook-ref";

/// Browser launch configuration
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

/// JavaScript evaluating to `[{id, tag}]` for every node any query matches,
/// deduplicated and in document order
#[must_use]
pub fn locator_script(queries: &[String]) -> String {
    format!(
        "(() => {{ const seen = new Set(); const out = []; \
         for (const group of [{groups}]) for (const el of group) \
         if (el && el.nodeType === 1 && !seen.has(el)) {{ seen.add(el); out.push(el); }} \
         out.sort((a, b) => a === b ? 0 : (a.compareDocumentPosition(b) & Node.DOCUMENT_POSITION_FOLLOWING) ? -1 : 1); \
         return out.map(el => {{ \
           if (!el.hasAttribute('{attr}')) {{ \
             window.__pagebookSeq = (window.__pagebookSeq || 0) + 1; \
             el.setAttribute('{attr}', 'pb-' + window.__pagebookSeq); }} \
           return {{ id: el.getAttribute('{attr}'), tag: el.tagName.toLowerCase() }}; }}); }})()",
        groups = queries.join(", "),
        attr = REF_ATTRIBUTE,
    )
}

/// JavaScript expression locating a tagged node, `null` when detached
#[must_use]
pub fn ref_lookup(id: &str) -> String {
    format!(
        "document.querySelector('[{REF_ATTRIBUTE}=' + JSON.stringify({}) + ']')",
        crate::selector::js_string(id)
    )
}

#[cfg(feature = "browser")]
#[allow(clippy::significant_drop_tightening, clippy::missing_errors_doc)]
mod cdp {
    use super::{locator_script, ref_lookup, BrowserConfig};
    use crate::driver::{DriverSession, ElementRef};
    use crate::locator::CompoundLocator;
    use crate::platform::Platform;
    use crate::result::{PagebookError, PagebookResult};
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use serde::Deserialize;
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use tracing::debug;

    #[derive(Debug, Deserialize)]
    struct FoundNode {
        id: String,
        tag: String,
    }

    #[derive(Debug, Deserialize)]
    struct Probe {
        attached: bool,
        value: Option<String>,
    }

    /// Web driver session backed by a Chromium page
    #[derive(Debug)]
    pub struct CdpSession {
        session_id: String,
        browser: Option<Arc<Mutex<CdpBrowser>>>,
        page: Arc<Mutex<CdpPage>>,
        #[allow(dead_code)]
        handle: Option<tokio::task::JoinHandle<()>>,
    }

    impl CdpSession {
        /// Launch a browser and open a blank page
        pub async fn launch(config: BrowserConfig) -> PagebookResult<Self> {
            let mut builder = CdpConfig::builder();
            if !config.headless {
                builder = builder.with_head();
            }
            if !config.sandbox {
                builder = builder.no_sandbox();
            }
            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }
            let cdp_config = builder.build().map_err(PagebookError::driver)?;

            let (browser, mut handler) = CdpBrowser::launch(cdp_config)
                .await
                .map_err(|e| PagebookError::driver(e.to_string()))?;

            let handle = tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });

            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| PagebookError::driver(e.to_string()))?;

            Ok(Self {
                session_id: format!("cdp-{}", uuid::Uuid::new_v4()),
                browser: Some(Arc::new(Mutex::new(browser))),
                page: Arc::new(Mutex::new(page)),
                handle: Some(handle),
            })
        }

        /// Wrap a page owned elsewhere
        #[must_use]
        pub fn from_page(page: CdpPage) -> Self {
            Self {
                session_id: format!("cdp-{}", uuid::Uuid::new_v4()),
                browser: None,
                page: Arc::new(Mutex::new(page)),
                handle: None,
            }
        }

        /// Navigate the page
        pub async fn goto(&self, url: &str) -> PagebookResult<()> {
            let page = self.page.lock().await;
            page.goto(url)
                .await
                .map_err(|e| PagebookError::driver(format!("navigation to {url} failed: {e}")))?;
            Ok(())
        }

        /// Close the browser if this session launched it
        pub async fn close(self) -> PagebookResult<()> {
            if let Some(browser) = self.browser {
                let mut browser = browser.lock().await;
                browser
                    .close()
                    .await
                    .map_err(|e| PagebookError::driver(e.to_string()))?;
            }
            Ok(())
        }

        async fn eval<T: serde::de::DeserializeOwned>(&self, expr: String) -> PagebookResult<T> {
            let page = self.page.lock().await;
            let result = page
                .evaluate(expr)
                .await
                .map_err(|e| PagebookError::driver(e.to_string()))?;
            result
                .into_value()
                .map_err(|e| PagebookError::driver(e.to_string()))
        }

        fn stale(element: &ElementRef) -> PagebookError {
            PagebookError::StaleElement {
                element: element.id.clone(),
                message: "node is no longer attached to the document".to_string(),
            }
        }
    }

    #[async_trait]
    impl DriverSession for CdpSession {
        fn session_id(&self) -> &str {
            &self.session_id
        }

        fn platform(&self) -> Platform {
            Platform::Web
        }

        async fn find_all(&self, locator: &CompoundLocator) -> PagebookResult<Vec<ElementRef>> {
            let queries: Vec<String> = locator
                .selectors()
                .iter()
                .filter_map(|s| s.to_web_query())
                .collect();
            if queries.is_empty() {
                debug!(locator = %locator, "no browser-evaluable selectors");
                return Ok(Vec::new());
            }
            let found: Vec<FoundNode> = self.eval(locator_script(&queries)).await?;
            Ok(found
                .into_iter()
                .map(|n| ElementRef::new(n.id, n.tag))
                .collect())
        }

        async fn text(&self, element: &ElementRef) -> PagebookResult<String> {
            let expr = format!(
                "(() => {{ const el = {}; return el ? {{ attached: true, value: el.innerText }} \
                 : {{ attached: false, value: null }}; }})()",
                ref_lookup(&element.id)
            );
            let probe: Probe = self.eval(expr).await?;
            if probe.attached {
                Ok(probe.value.unwrap_or_default())
            } else {
                Err(Self::stale(element))
            }
        }

        async fn attribute(
            &self,
            element: &ElementRef,
            name: &str,
        ) -> PagebookResult<Option<String>> {
            let expr = format!(
                "(() => {{ const el = {}; return el ? {{ attached: true, value: el.getAttribute({}) }} \
                 : {{ attached: false, value: null }}; }})()",
                ref_lookup(&element.id),
                crate::selector::js_string(name)
            );
            let probe: Probe = self.eval(expr).await?;
            if probe.attached {
                Ok(probe.value)
            } else {
                Err(Self::stale(element))
            }
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::CdpSession;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::Selector;

    #[test]
    fn test_locator_script_joins_queries() {
        let queries: Vec<String> = [Selector::css(".a"), Selector::id("b")]
            .iter()
            .filter_map(Selector::to_web_query)
            .collect();
        let script = locator_script(&queries);
        assert!(script.contains("querySelectorAll(\".a\")), [document.getElementById(\"b\")]"));
        assert!(script.contains(REF_ATTRIBUTE));
        assert!(script.starts_with("(() =>"));
    }

    #[test]
    fn test_ref_lookup_quotes_id() {
        assert_eq!(
            ref_lookup("pb-1"),
            "document.querySelector('[data-pagebook-ref=' + JSON.stringify(\"pb-1\") + ']')"
        );
    }

    #[test]
    fn test_config_builders() {
        let config = BrowserConfig::default()
            .with_headless(false)
            .with_no_sandbox()
            .with_chromium_path("/usr/bin/chromium");
        assert!(!config.headless);
        assert!(!config.sandbox);
        assert_eq!(config.chromium_path.as_deref(), Some("/usr/bin/chromium"));
    }
}
