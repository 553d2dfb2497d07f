//! Registration and credential checks.
//!
//! Binding an authenticated user to a session is left to
//! [`SessionContext::attach_user`](crate::context::SessionContext::attach_user);
//! this module only decides who the user is.

use std::sync::Arc;

use crate::error::ServiceError;
use crate::metrics::Metrics;
use crate::password;
use crate::repository::{NewUser, User, UserRepository};
use crate::types::UserSnapshot;

const USERNAME_MIN_CHARS: usize = 4;
const USERNAME_MAX_CHARS: usize = 12;

/// Login flavours accepted by the login form's `requestType` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginKind {
    /// Username and password.
    Simple,
    /// QQ OAuth; not supported.
    Qq,
    /// WeChat OAuth; not supported.
    Wechat,
}

impl LoginKind {
    pub fn parse(request_type: &str) -> Option<Self> {
        match request_type {
            "simple" => Some(Self::Simple),
            "qq" => Some(Self::Qq),
            "wechat" => Some(Self::Wechat),
            _ => None,
        }
    }
}

/// A registration form after extraction from the transport.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub nickname: Option<String>,
}

pub struct AccountService {
    users: Arc<dyn UserRepository>,
    metrics: Arc<Metrics>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserRepository>, metrics: Arc<Metrics>) -> Self {
        Self { users, metrics }
    }

    /// Creates an account with the given default role.
    pub fn register(&self, form: Registration, role_id: i64) -> Result<User, ServiceError> {
        let username = form.username.trim();
        let len = username.chars().count();
        if !(USERNAME_MIN_CHARS..=USERNAME_MAX_CHARS).contains(&len) {
            return Err(ServiceError::bad_request("invalid username length"));
        }
        if form.password.is_empty() {
            return Err(ServiceError::bad_request("password must not be empty"));
        }
        if self.users.find_by_username(username).is_some() {
            return Err(ServiceError::Conflict("username already exists".to_owned()));
        }

        let nickname = form
            .nickname
            .map(|n| n.trim().to_owned())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| username.to_owned());

        let user = self.users.save(NewUser {
            username: username.to_owned(),
            password_digest: password::digest(&form.password),
            nickname,
            default_role_id: role_id,
        })?;
        self.metrics.record_registration();
        tracing::info!(user_id = user.id, username = %user.username, "account registered");
        Ok(user)
    }

    /// Verifies credentials and returns the snapshot to bind to the session.
    ///
    /// Unknown users, wrong passwords and disabled accounts are all reported
    /// as `Unauthorized`.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<UserSnapshot, ServiceError> {
        let Some(user) = self.users.find_by_username(username.trim()) else {
            return Err(self.reject(username, "unknown user"));
        };
        if !password::verify(password, &user.password_digest) {
            return Err(self.reject(username, "wrong password"));
        }
        if !user.enabled {
            return Err(self.reject(username, "account disabled"));
        }

        self.metrics.record_login();
        Ok(user.snapshot())
    }

    pub fn user_count(&self) -> usize {
        self.users.count()
    }

    fn reject(&self, username: &str, reason: &str) -> ServiceError {
        self.metrics.record_login_failure();
        tracing::warn!(username, reason, "login rejected");
        ServiceError::Unauthorized
    }
}
