//! Transport-agnostic types shared across the service layer.

use std::borrow::Borrow;
use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque session identifier carried to the browser in the session cookie.
///
/// Always a server-generated UUID v4 in canonical hyphenated form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Generates a fresh identifier from the OS random source.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().hyphenated().to_string())
    }

    /// Parses an inbound cookie value. Anything that is not a canonical
    /// hyphenated UUID yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let uuid = Uuid::parse_str(raw).ok()?;
        let canonical = uuid.hyphenated().to_string();
        (canonical == raw).then_some(Self(canonical))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for SessionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Denormalized projection of an authenticated user, owned by a session.
///
/// Only ever replaced or cleared as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub id: i64,
    pub username: String,
    /// Display name.
    pub nickname: String,
    pub default_role_id: i64,
    pub enabled: bool,
}

/// Copy of a session's state handed out by the store.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub id: SessionId,
    /// `None` for anonymous visitors.
    pub user: Option<UserSnapshot>,
    pub last_access: Instant,
}
