//! User and role repositories.
//!
//! The traits are the seam to the system of record. The in-memory
//! implementations back the server when no external store is wired in and
//! are what the tests run against.

use std::sync::atomic::{AtomicI64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::error::ServiceError;
use crate::types::UserSnapshot;

/// A stored account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_digest: String,
    pub nickname: String,
    pub default_role_id: i64,
    pub enabled: bool,
}

impl User {
    /// Projection stored in the session on login.
    pub fn snapshot(&self) -> UserSnapshot {
        UserSnapshot {
            id: self.id,
            username: self.username.clone(),
            nickname: self.nickname.clone(),
            default_role_id: self.default_role_id,
            enabled: self.enabled,
        }
    }
}

/// An account that has not been assigned an id yet.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_digest: String,
    pub nickname: String,
    pub default_role_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: i64,
    pub name: String,
}

pub trait UserRepository: Send + Sync {
    fn find_by_username(&self, username: &str) -> Option<User>;

    /// Stores a new account and assigns its id. Fails with `Conflict` when
    /// the username is taken.
    fn save(&self, user: NewUser) -> Result<User, ServiceError>;

    fn count(&self) -> usize;
}

pub trait RoleRepository: Send + Sync {
    fn find_by_name(&self, name: &str) -> Option<Role>;

    /// Returns the role named `name`, creating it if needed.
    fn save(&self, name: &str) -> Role;
}

#[derive(Debug)]
pub struct InMemoryUserRepository {
    users: DashMap<String, User>,
    next_id: AtomicI64,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }
}

impl UserRepository for InMemoryUserRepository {
    fn find_by_username(&self, username: &str) -> Option<User> {
        self.users.get(username).map(|u| u.value().clone())
    }

    fn save(&self, user: NewUser) -> Result<User, ServiceError> {
        match self.users.entry(user.username.clone()) {
            Entry::Occupied(_) => Err(ServiceError::Conflict(format!(
                "username '{}' already exists",
                user.username
            ))),
            Entry::Vacant(slot) => {
                let stored = User {
                    id: self.next_id.fetch_add(1, Ordering::Relaxed),
                    username: user.username,
                    password_digest: user.password_digest,
                    nickname: user.nickname,
                    default_role_id: user.default_role_id,
                    enabled: true,
                };
                slot.insert(stored.clone());
                Ok(stored)
            }
        }
    }

    fn count(&self) -> usize {
        self.users.len()
    }
}

#[derive(Debug)]
pub struct InMemoryRoleRepository {
    roles: DashMap<String, Role>,
    next_id: AtomicI64,
}

impl Default for InMemoryRoleRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRoleRepository {
    pub fn new() -> Self {
        Self {
            roles: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }
}

impl RoleRepository for InMemoryRoleRepository {
    fn find_by_name(&self, name: &str) -> Option<Role> {
        self.roles.get(name).map(|r| r.value().clone())
    }

    fn save(&self, name: &str) -> Role {
        self.roles
            .entry(name.to_owned())
            .or_insert_with(|| Role {
                id: self.next_id.fetch_add(1, Ordering::Relaxed),
                name: name.to_owned(),
            })
            .value()
            .clone()
    }
}
