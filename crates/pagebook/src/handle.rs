//! Element handles: a node reference bound to the session that owns it.
//!
//! A handle is either lazy (a locator that is queried on first use) or
//! resolved (a concrete node). Both variants carry their session, so
//! routing a follow-up interaction is a field read.

use crate::driver::{ElementRef, SessionRef};
use crate::locator::CompoundLocator;
use crate::platform::Platform;
use crate::result::{NotFoundReason, PagebookError, PagebookResult};
use std::fmt;

/// Two-state element handle
#[derive(Clone)]
pub enum ElementHandle {
    /// Locator not yet queried
    Unresolved {
        /// Locator to query
        locator: CompoundLocator,
        /// Owning session
        session: SessionRef,
    },
    /// Concrete node
    Resolved {
        /// Node reference
        element: ElementRef,
        /// Owning session
        session: SessionRef,
    },
}

impl ElementHandle {
    /// Create a lazy handle
    #[must_use]
    pub fn unresolved(locator: CompoundLocator, session: SessionRef) -> Self {
        Self::Unresolved { locator, session }
    }

    /// Create a resolved handle
    #[must_use]
    pub fn resolved(element: ElementRef, session: SessionRef) -> Self {
        Self::Resolved { element, session }
    }

    /// Session that services this handle
    #[must_use]
    pub fn session(&self) -> &SessionRef {
        match self {
            Self::Unresolved { session, .. } | Self::Resolved { session, .. } => session,
        }
    }

    /// Platform of the owning session
    #[must_use]
    pub fn platform(&self) -> Platform {
        self.session().platform()
    }

    /// Whether the handle points at a concrete node
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }

    /// Locator of a lazy handle
    #[must_use]
    pub const fn locator(&self) -> Option<&CompoundLocator> {
        match self {
            Self::Unresolved { locator, .. } => Some(locator),
            Self::Resolved { .. } => None,
        }
    }

    /// Node of a resolved handle
    #[must_use]
    pub const fn element(&self) -> Option<&ElementRef> {
        match self {
            Self::Unresolved { .. } => None,
            Self::Resolved { element, .. } => Some(element),
        }
    }

    /// Query a lazy handle and return the resolved form
    pub async fn materialize(self) -> PagebookResult<Self> {
        match self {
            Self::Resolved { .. } => Ok(self),
            Self::Unresolved { locator, session } => {
                let element = find_first(&session, &locator).await?;
                Ok(Self::Resolved { element, session })
            }
        }
    }

    /// Current node reference; lazy handles are queried on every call
    pub async fn element_ref(&self) -> PagebookResult<ElementRef> {
        match self {
            Self::Resolved { element, .. } => Ok(element.clone()),
            Self::Unresolved { locator, session } => find_first(session, locator).await,
        }
    }

    /// Visible text of the node
    pub async fn text(&self) -> PagebookResult<String> {
        let element = self.element_ref().await?;
        self.session().text(&element).await
    }

    /// Attribute value of the node
    pub async fn attribute(&self, name: &str) -> PagebookResult<Option<String>> {
        let element = self.element_ref().await?;
        self.session().attribute(&element, name).await
    }
}

async fn find_first(session: &SessionRef, locator: &CompoundLocator) -> PagebookResult<ElementRef> {
    session
        .find_one(locator)
        .await?
        .ok_or_else(|| no_live_match(locator))
}

/// `ElementNotFound` for a declared locator that matched nothing
pub(crate) fn no_live_match(locator: &CompoundLocator) -> PagebookError {
    let (page, element) = locator.origin().map_or_else(
        || (String::new(), locator.to_string()),
        |o| (o.page.clone(), o.element.clone()),
    );
    PagebookError::ElementNotFound {
        element,
        page,
        reason: NotFoundReason::NoLiveMatch {
            locator: locator.to_string(),
        },
    }
}

impl PartialEq for ElementHandle {
    fn eq(&self, other: &Self) -> bool {
        if self.session().session_id() != other.session().session_id() {
            return false;
        }
        match (self, other) {
            (Self::Resolved { element: a, .. }, Self::Resolved { element: b, .. }) => a == b,
            (Self::Unresolved { locator: a, .. }, Self::Unresolved { locator: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unresolved { locator, session } => f
                .debug_struct("Unresolved")
                .field("locator", &locator.to_string())
                .field("session", &session.session_id())
                .finish(),
            Self::Resolved { element, session } => f
                .debug_struct("Resolved")
                .field("element", element)
                .field("session", &session.session_id())
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{MockNode, MockSession};
    use std::sync::Arc;

    fn session() -> (Arc<MockSession>, ElementRef) {
        let session = MockSession::web().shared();
        let el = session.add_node(
            MockNode::new("button")
                .with_attr("id", "go")
                .with_text("Go"),
        );
        (session, el)
    }

    #[tokio::test]
    async fn test_materialize_resolves_lazy_handle() {
        let (mock, el) = session();
        let handle = ElementHandle::unresolved(CompoundLocator::css("#go"), mock.clone());
        assert!(!handle.is_resolved());
        assert!(!mock.was_called("find"));

        let resolved = handle.materialize().await.unwrap();
        assert!(resolved.is_resolved());
        assert_eq!(resolved.element(), Some(&el));
        assert_eq!(resolved.platform(), Platform::Web);
    }

    #[tokio::test]
    async fn test_materialize_missing_is_no_live_match() {
        let (mock, _) = session();
        let locator = CompoundLocator::css("#nope").with_origin("Home", "banner");
        let err = ElementHandle::unresolved(locator, mock)
            .materialize()
            .await
            .unwrap_err();
        match err {
            PagebookError::ElementNotFound {
                element,
                page,
                reason: NotFoundReason::NoLiveMatch { .. },
            } => {
                assert_eq!(element, "banner");
                assert_eq!(page, "Home");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_lazy_handle_reads_through_session() {
        let (mock, el) = session();
        let handle = ElementHandle::unresolved(CompoundLocator::css("#go"), mock.clone());
        assert_eq!(handle.text().await.unwrap(), "Go");
        mock.set_text(&el, "Going");
        assert_eq!(handle.text().await.unwrap(), "Going");
        assert_eq!(handle.attribute("id").await.unwrap(), Some("go".into()));
    }

    #[tokio::test]
    async fn test_equality_by_session_and_node() {
        let (mock, el) = session();
        let other = MockSession::web().shared();
        let a = ElementHandle::resolved(el.clone(), mock.clone());
        let b = ElementHandle::resolved(el.clone(), mock.clone());
        let c = ElementHandle::resolved(el, other);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
