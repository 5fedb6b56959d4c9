//! Driver routing: which session services a page or a handle.

use crate::driver::SessionRef;
use crate::handle::ElementHandle;
use crate::platform::Platform;
use crate::result::{PagebookError, PagebookResult};
use std::fmt;

/// Holds at most one session per platform
#[derive(Clone, Default)]
pub struct DriverRouter {
    web: Option<SessionRef>,
    mobile: Option<SessionRef>,
}

impl DriverRouter {
    /// Create a router with no sessions
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the web session
    #[must_use]
    pub fn with_web(mut self, session: SessionRef) -> Self {
        self.web = Some(session);
        self
    }

    /// Register the mobile session
    #[must_use]
    pub fn with_mobile(mut self, session: SessionRef) -> Self {
        self.mobile = Some(session);
        self
    }

    /// Register a session under the platform it reports
    pub fn register(&mut self, session: SessionRef) {
        match session.platform() {
            Platform::Web => self.web = Some(session),
            Platform::Mobile => self.mobile = Some(session),
        }
    }

    /// Whether a session is registered for the platform
    #[must_use]
    pub const fn has(&self, platform: Platform) -> bool {
        match platform {
            Platform::Web => self.web.is_some(),
            Platform::Mobile => self.mobile.is_some(),
        }
    }

    /// Session for a platform
    pub fn route(&self, platform: Platform) -> PagebookResult<SessionRef> {
        let session = match platform {
            Platform::Web => self.web.as_ref(),
            Platform::Mobile => self.mobile.as_ref(),
        };
        session
            .cloned()
            .ok_or_else(|| PagebookError::DriverUnavailable {
                platform: platform.to_string(),
            })
    }

    /// Session for a raw repository platform tag
    pub fn route_for_tag(&self, tag: &str) -> PagebookResult<SessionRef> {
        self.route(tag.parse()?)
    }

    /// Session owning a handle
    #[must_use]
    pub fn route_for_handle(&self, handle: &ElementHandle) -> SessionRef {
        handle.session().clone()
    }
}

impl fmt::Debug for DriverRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverRouter")
            .field("web", &self.web.as_ref().map(|s| s.session_id().to_string()))
            .field(
                "mobile",
                &self.mobile.as_ref().map(|s| s.session_id().to_string()),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{ElementRef, MockSession};
    use crate::locator::CompoundLocator;
    use std::sync::Arc;

    fn router() -> DriverRouter {
        DriverRouter::new()
            .with_web(Arc::new(MockSession::web().with_session_id("web-1")))
            .with_mobile(Arc::new(MockSession::mobile().with_session_id("mob-1")))
    }

    #[test]
    fn test_route_by_platform() {
        let r = router();
        assert_eq!(r.route(Platform::Web).unwrap().session_id(), "web-1");
        assert_eq!(r.route(Platform::Mobile).unwrap().session_id(), "mob-1");
    }

    #[test]
    fn test_route_by_tag_aliases() {
        let r = router();
        assert_eq!(r.route_for_tag("Browser").unwrap().session_id(), "web-1");
        assert_eq!(r.route_for_tag("android").unwrap().session_id(), "mob-1");
        assert_eq!(r.route_for_tag("iOS").unwrap().session_id(), "mob-1");
    }

    #[test]
    fn test_unknown_tag_fails_fast() {
        let err = router().route_for_tag("desktop").unwrap_err();
        assert!(matches!(err, PagebookError::UnsupportedPlatform { .. }));
    }

    #[test]
    fn test_missing_session_is_driver_unavailable() {
        let r = DriverRouter::new().with_web(Arc::new(MockSession::web()));
        let err = r.route(Platform::Mobile).unwrap_err();
        assert!(matches!(
            err,
            PagebookError::DriverUnavailable { ref platform } if platform == "mobile"
        ));
        assert!(r.has(Platform::Web));
        assert!(!r.has(Platform::Mobile));
    }

    #[test]
    fn test_register_uses_session_platform() {
        let mut r = DriverRouter::new();
        r.register(Arc::new(MockSession::mobile().with_session_id("m")));
        assert_eq!(r.route(Platform::Mobile).unwrap().session_id(), "m");
    }

    #[test]
    fn test_route_for_handle_is_field_read() {
        let r = router();
        let mobile = r.route(Platform::Mobile).unwrap();
        let resolved = ElementHandle::resolved(ElementRef::new("n1", "Button"), mobile);
        assert_eq!(r.route_for_handle(&resolved).session_id(), "mob-1");

        let web = r.route(Platform::Web).unwrap();
        let lazy = ElementHandle::unresolved(CompoundLocator::css("#a"), web);
        assert_eq!(r.route_for_handle(&lazy).platform(), Platform::Web);
    }
}
