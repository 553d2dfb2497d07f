//! Noteblog Service: per-visitor session state and application context for
//! the Noteblog server.
//!
//! This crate holds all transport-agnostic logic: the concurrent session
//! store, the startup-populated application registry, the session context
//! facade that request handlers go through, and the account flows (login
//! and registration) that decide which user a session carries.
//!
//! **Zero transport dependencies**: no axum, no HTTP types. The HTTP crate
//! hands in raw cookie headers and renders the returned cookie instructions.

pub mod accounts;
pub mod bootstrap;
pub mod context;
pub mod cookie;
pub mod error;
pub mod metrics;
pub mod password;
pub mod registry;
pub mod repository;
pub mod session;
pub mod types;

use std::sync::Arc;
use std::time::{Duration, Instant};

use accounts::AccountService;
use bootstrap::SeedAccount;
use context::SessionContext;
use crate::cookie::CookiePolicy;
use error::ServiceError;
use metrics::Metrics;
use repository::{InMemoryRoleRepository, InMemoryUserRepository, RoleRepository, UserRepository};
use session::SessionStore;

/// Configuration subset relevant to the service layer.
///
/// Transport-specific config (bind address, CORS origins) stays in the
/// binary crate's `Config` struct.
pub struct ServiceConfig {
    pub session_ttl: u64,
    pub session_cookie: String,
    pub cookie_max_age: Option<u64>,
    pub webmaster: Option<SeedAccount>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            session_ttl: 1800,
            session_cookie: crate::cookie::DEFAULT_SESSION_COOKIE.to_owned(),
            cookie_max_age: None,
            webmaster: None,
        }
    }
}

/// Shared service state, cloneable across all request handlers.
///
/// Built once at startup and passed by reference into every request path.
#[derive(Clone)]
pub struct ServiceState {
    inner: Arc<Inner>,
}

struct Inner {
    context: SessionContext,
    accounts: AccountService,
    metrics: Arc<Metrics>,
    start_time: Instant,
}

impl ServiceState {
    /// Creates the service state backed by the in-memory repositories,
    /// seeding roles and the registry.
    pub fn new(config: &ServiceConfig) -> Result<Self, ServiceError> {
        Self::with_repositories(
            config,
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryRoleRepository::new()),
        )
    }

    /// Creates the service state on top of caller-provided repositories.
    pub fn with_repositories(
        config: &ServiceConfig,
        users: Arc<dyn UserRepository>,
        roles: Arc<dyn RoleRepository>,
    ) -> Result<Self, ServiceError> {
        let registry = bootstrap::seed(users.as_ref(), roles.as_ref(), config.webmaster.as_ref())?;
        let cookies = CookiePolicy::new(
            config.session_cookie.as_str(),
            config.cookie_max_age.map(Duration::from_secs),
        )?;
        let metrics = Arc::new(Metrics::new());

        Ok(Self {
            inner: Arc::new(Inner {
                context: SessionContext::new(
                    SessionStore::new(Duration::from_secs(config.session_ttl)),
                    registry,
                    cookies,
                    Arc::clone(&metrics),
                ),
                accounts: AccountService::new(users, Arc::clone(&metrics)),
                metrics,
                start_time: Instant::now(),
            }),
        })
    }

    /// Creates an in-memory service state with default settings (for tests
    /// and ephemeral use).
    pub fn new_in_memory(session_ttl: u64) -> Self {
        let config = ServiceConfig {
            session_ttl,
            ..ServiceConfig::default()
        };
        Self::new(&config).expect("seeding empty in-memory repositories cannot fail")
    }

    // --- Accessors ---

    pub fn context(&self) -> &SessionContext {
        &self.inner.context
    }

    pub fn accounts(&self) -> &AccountService {
        &self.inner.accounts
    }

    pub fn metrics(&self) -> &Metrics {
        &self.inner.metrics
    }

    pub fn uptime_secs(&self) -> u64 {
        self.inner.start_time.elapsed().as_secs()
    }

    // --- Maintenance ---

    /// Clean up expired sessions. Returns count removed.
    pub fn cleanup_expired_sessions(&self) -> usize {
        self.inner.context.evict_expired()
    }
}
