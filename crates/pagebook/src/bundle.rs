//! Element + payload pairs for batch interactions such as form filling.

use crate::handle::ElementHandle;
use crate::platform::Platform;
use crate::repository::ElementRepository;
use crate::result::PagebookResult;
use tracing::debug;

/// A resolved element travelling with the data to apply to it
#[derive(Debug, Clone, PartialEq)]
pub struct ElementBundle<T> {
    /// Element handle
    pub element: ElementHandle,
    /// Logical element name
    pub name: String,
    /// Platform of the owning session
    pub platform: Platform,
    /// Caller data
    pub payload: T,
}

impl<T> ElementBundle<T> {
    /// Bundle a handle with a payload
    #[must_use]
    pub fn new(element: ElementHandle, name: impl Into<String>, payload: T) -> Self {
        let platform = element.platform();
        Self {
            element,
            name: name.into(),
            platform,
            payload,
        }
    }

    /// Replace the payload
    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ElementBundle<U> {
        ElementBundle {
            element: self.element,
            name: self.name,
            platform: self.platform,
            payload: f(self.payload),
        }
    }
}

/// Resolve several named elements on one page, in order, failing on the
/// first name that cannot be resolved
pub async fn bundle_elements<R, I, S, T>(
    repo: &R,
    page: &str,
    entries: I,
) -> PagebookResult<Vec<ElementBundle<T>>>
where
    R: ElementRepository + ?Sized,
    I: IntoIterator<Item = (S, T)>,
    S: Into<String>,
{
    let mut bundles = Vec::new();
    for (name, payload) in entries {
        let name = name.into();
        let element = repo.element(&name, page).await?;
        bundles.push(ElementBundle::new(element, name, payload));
    }
    debug!(page, count = bundles.len(), "bundled elements");
    Ok(bundles)
}
