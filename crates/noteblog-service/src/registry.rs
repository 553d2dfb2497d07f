//! Process-wide application values derived at startup.
//!
//! Values are written through a [`RegistryBuilder`] while the server boots and
//! frozen into an [`ApplicationRegistry`] that only exposes reads. Request
//! handlers only ever see the frozen registry, so it needs no lock.

use std::collections::HashMap;
use std::fmt;

use crate::error::ServiceError;

/// Registry key holding the id of the webmaster role.
pub const WEBMASTER_ROLE_ID: &str = "webmaster_role_id";
/// Registry key holding the id of the role given to self-registered users.
pub const USER_ROLE_ID: &str = "user_role_id";

/// A scalar application value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppValue {
    Integer(i64),
    Text(String),
    Flag(bool),
}

impl AppValue {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for AppValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
            Self::Flag(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for AppValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<String> for AppValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for AppValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<bool> for AppValue {
    fn from(v: bool) -> Self {
        Self::Flag(v)
    }
}

/// Startup-only write side of the registry.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    values: HashMap<String, AppValue>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a value, replacing any earlier value under the same name.
    pub fn put(&mut self, name: impl Into<String>, value: impl Into<AppValue>) -> &mut Self {
        let name = name.into();
        let value = value.into();
        tracing::debug!(%name, %value, "registered application value");
        self.values.insert(name, value);
        self
    }

    /// Freezes the registry. No further writes are possible.
    pub fn build(self) -> ApplicationRegistry {
        ApplicationRegistry {
            values: self.values,
        }
    }
}

/// Read-only registry of application values.
#[derive(Debug, Default)]
pub struct ApplicationRegistry {
    values: HashMap<String, AppValue>,
}

impl ApplicationRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Looks up a value. A missing name is a deployment defect, never
    /// silently defaulted.
    pub fn get(&self, name: &str) -> Result<&AppValue, ServiceError> {
        self.values.get(name).ok_or_else(|| {
            tracing::error!(name, "application value was never registered");
            ServiceError::configuration_missing(name)
        })
    }

    /// Looks up an integer value. A value of another type is reported as
    /// missing configuration too.
    pub fn integer(&self, name: &str) -> Result<i64, ServiceError> {
        self.get(name)?.as_integer().ok_or_else(|| {
            tracing::error!(name, "application value is not an integer");
            ServiceError::configuration_missing(name)
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
