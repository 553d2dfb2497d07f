//! Session context: the single entry point request handlers use for
//! per-visitor state and application values.
//!
//! Translates between the session cookie and the in-memory [`SessionStore`].
//! Nothing here performs I/O, so every call is safe to run inline on the
//! request task.

use std::sync::Arc;
use std::time::Instant;

use crate::cookie::{CookiePolicy, InboundCookies, REMEMBER_COOKIE, SetCookie};
use crate::error::ServiceError;
use crate::metrics::Metrics;
use crate::registry::{AppValue, ApplicationRegistry, WEBMASTER_ROLE_ID};
use crate::session::SessionStore;
use crate::types::{SessionId, UserSnapshot};

/// Outcome of resolving the session for one request.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub id: SessionId,
    pub user: Option<UserSnapshot>,
    /// Present when a new session was issued; the transport must attach it
    /// to the response.
    pub set_cookie: Option<SetCookie>,
}

impl Resolution {
    /// Whether this request started a new session.
    pub fn is_new(&self) -> bool {
        self.set_cookie.is_some()
    }
}

pub struct SessionContext {
    store: SessionStore,
    registry: ApplicationRegistry,
    cookies: CookiePolicy,
    metrics: Arc<Metrics>,
}

impl SessionContext {
    pub fn new(
        store: SessionStore,
        registry: ApplicationRegistry,
        cookies: CookiePolicy,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            store,
            registry,
            cookies,
            metrics,
        }
    }

    /// Resolves the session named by the inbound session cookie, or issues a
    /// new one when the cookie is absent, malformed, unknown or expired.
    pub fn resolve_or_create(&self, inbound: &InboundCookies) -> Resolution {
        if let Some(id) = self.session_id(inbound)
            && let Some(record) = self.store.resolve(id.as_str())
        {
            return Resolution {
                id: record.id,
                user: record.user,
                set_cookie: None,
            };
        }

        let id = self.store.create();
        self.metrics.record_session_created();
        Resolution {
            set_cookie: Some(SetCookie::session(&self.cookies, id.as_str())),
            id,
            user: None,
        }
    }

    /// Binds `user` to a fresh session and instructs the client to switch to
    /// it.
    ///
    /// Any session named by the inbound cookie is dropped first, so an
    /// identifier handed out before authentication never carries a user
    /// (session fixation).
    pub fn attach_user(&self, inbound: &InboundCookies, user: UserSnapshot) -> Resolution {
        if let Some(previous) = self.session_id(inbound)
            && self.store.remove(previous.as_str())
        {
            tracing::debug!(session = %previous, "pre-login session retired");
        }

        let id = self.store.create();
        self.metrics.record_session_created();
        self.store.set_user(&id, user.clone());
        tracing::info!(
            session = %id,
            user_id = user.id,
            username = %user.username,
            "user attached to session"
        );
        Resolution {
            set_cookie: Some(SetCookie::session(&self.cookies, id.as_str())),
            id,
            user: Some(user),
        }
    }

    /// Returns the user bound to a live session, if any.
    pub fn current_user(&self, id: &str) -> Option<UserSnapshot> {
        self.store.resolve(id)?.user
    }

    /// Drops the session and returns the cookie removals the transport
    /// should send back: the remember-me cookie and the session cookie.
    pub fn end_session(&self, id: &str) -> [SetCookie; 2] {
        if self.store.remove(id) {
            self.metrics.record_session_ended();
            tracing::info!(session = id, "session ended");
        }
        [
            SetCookie::removal(REMEMBER_COOKIE),
            SetCookie::removal(self.cookies.name()),
        ]
    }

    pub fn registry_value(&self, name: &str) -> Result<&AppValue, ServiceError> {
        self.registry.get(name)
    }

    pub fn registry_integer(&self, name: &str) -> Result<i64, ServiceError> {
        self.registry.integer(name)
    }

    /// Whether `user`'s default role is the webmaster role.
    pub fn is_webmaster(&self, user: &UserSnapshot) -> Result<bool, ServiceError> {
        Ok(user.default_role_id == self.registry_integer(WEBMASTER_ROLE_ID)?)
    }

    /// Sweeps sessions idle longer than the configured TTL. Intended for the
    /// background cleanup task only.
    pub fn evict_expired(&self) -> usize {
        let removed = self
            .store
            .evict_expired(Instant::now(), self.store.ttl());
        self.metrics.record_sessions_evicted(removed);
        removed
    }

    pub fn active_sessions(&self) -> usize {
        self.store.active_count()
    }

    pub fn cookie_name(&self) -> &str {
        self.cookies.name()
    }

    /// Extracts the session id from the inbound cookies. A value that does
    /// not decode is treated exactly like a missing cookie.
    pub fn session_id(&self, inbound: &InboundCookies) -> Option<SessionId> {
        let raw = inbound.get(self.cookies.name())?;
        let id = SessionId::parse(raw);
        if id.is_none() {
            tracing::debug!(cookie = %self.cookies.name(), "ignoring malformed session cookie");
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::registry::USER_ROLE_ID;

    fn context() -> SessionContext {
        let mut registry = ApplicationRegistry::builder();
        registry.put(WEBMASTER_ROLE_ID, 1_i64).put(USER_ROLE_ID, 2_i64);
        SessionContext::new(
            SessionStore::new(Duration::from_secs(60)),
            registry.build(),
            CookiePolicy::default(),
            Arc::new(Metrics::new()),
        )
    }

    fn cookies_for(ctx: &SessionContext, value: &str) -> InboundCookies {
        InboundCookies::parse([format!("{}={value}", ctx.cookie_name()).as_str()])
    }

    fn user(role: i64) -> UserSnapshot {
        UserSnapshot {
            id: 10,
            username: "wuwenbin".to_owned(),
            nickname: "Wu".to_owned(),
            default_role_id: role,
            enabled: true,
        }
    }

    #[test]
    fn test_no_cookie_issues_session_and_cookie() {
        let ctx = context();
        let res = ctx.resolve_or_create(&InboundCookies::default());
        assert!(res.is_new());
        assert!(res.user.is_none());

        let cookie = res.set_cookie.unwrap();
        assert_eq!(cookie.name, ctx.cookie_name());
        assert_eq!(cookie.value, res.id.as_str());
        assert!(cookie.http_only);
        assert_eq!(cookie.path, "/");
        assert_eq!(ctx.active_sessions(), 1);
    }

    #[test]
    fn test_known_cookie_resolves_without_new_cookie() {
        let ctx = context();
        let first = ctx.resolve_or_create(&InboundCookies::default());
        let again = ctx.resolve_or_create(&cookies_for(&ctx, first.id.as_str()));
        assert_eq!(again.id, first.id);
        assert!(again.set_cookie.is_none());
        assert_eq!(ctx.active_sessions(), 1);
    }

    #[test]
    fn test_unknown_cookie_behaves_like_absent() {
        let ctx = context();
        let stale = SessionId::generate();
        let res = ctx.resolve_or_create(&cookies_for(&ctx, stale.as_str()));
        assert_ne!(res.id, stale);
        assert_eq!(res.set_cookie.unwrap().value, res.id.as_str());
    }

    #[test]
    fn test_malformed_cookie_behaves_like_absent() {
        let ctx = context();
        for raw in ["", "not-a-uuid", "6F1C1C52-7F4E-4F41-9D5E-6A3F0B7F9C11", "%%%"] {
            let res = ctx.resolve_or_create(&cookies_for(&ctx, raw));
            assert!(res.is_new(), "cookie {raw:?} should start a new session");
        }
    }

    #[test]
    fn test_attach_user_then_current_user_then_end() {
        let ctx = context();
        let res = ctx.attach_user(&InboundCookies::default(), user(2));
        assert!(res.is_new());
        assert_eq!(ctx.current_user(res.id.as_str()), Some(user(2)));

        let removals = ctx.end_session(res.id.as_str());
        assert!(removals.iter().all(SetCookie::is_removal));
        assert!(removals.iter().any(|c| c.name == REMEMBER_COOKIE));
        assert!(ctx.current_user(res.id.as_str()).is_none());

        // Ending twice is harmless.
        ctx.end_session(res.id.as_str());
    }

    #[test]
    fn test_attach_user_rotates_existing_session() {
        let ctx = context();
        let anon = ctx.resolve_or_create(&InboundCookies::default());
        let res = ctx.attach_user(&cookies_for(&ctx, anon.id.as_str()), user(1));

        assert_ne!(res.id, anon.id);
        assert_eq!(res.set_cookie.unwrap().value, res.id.as_str());
        assert!(ctx.current_user(anon.id.as_str()).is_none());
        assert_eq!(ctx.current_user(res.id.as_str()), Some(user(1)));
        assert_eq!(ctx.active_sessions(), 1);
    }

    #[test]
    fn test_attach_user_ignores_foreign_cookie_value() {
        let ctx = context();
        let planted = SessionId::generate();
        let res = ctx.attach_user(&cookies_for(&ctx, planted.as_str()), user(2));
        assert_ne!(res.id, planted);
        assert!(ctx.current_user(planted.as_str()).is_none());
    }

    #[test]
    fn test_registry_access() {
        let ctx = context();
        assert_eq!(ctx.registry_integer(WEBMASTER_ROLE_ID).unwrap(), 1);
        assert_eq!(ctx.registry_value(USER_ROLE_ID).unwrap(), &AppValue::Integer(2));
        assert!(matches!(
            ctx.registry_value("nonexistent-key"),
            Err(ServiceError::ConfigurationMissing(_))
        ));
        assert!(ctx.is_webmaster(&user(1)).unwrap());
        assert!(!ctx.is_webmaster(&user(2)).unwrap());
    }

    #[test]
    fn test_is_webmaster_without_registry_fails() {
        let ctx = SessionContext::new(
            SessionStore::new(Duration::from_secs(60)),
            ApplicationRegistry::builder().build(),
            CookiePolicy::default(),
            Arc::new(Metrics::new()),
        );
        assert!(matches!(
            ctx.is_webmaster(&user(1)),
            Err(ServiceError::ConfigurationMissing(_))
        ));
    }

    #[test]
    fn test_evict_expired_with_zero_ttl() {
        let ctx = SessionContext::new(
            SessionStore::new(Duration::ZERO),
            ApplicationRegistry::builder().build(),
            CookiePolicy::default(),
            Arc::new(Metrics::new()),
        );
        ctx.resolve_or_create(&InboundCookies::default());
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(ctx.evict_expired(), 1);
        assert_eq!(ctx.active_sessions(), 0);
    }
}
