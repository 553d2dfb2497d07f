//! Route handlers.

pub mod entrance;
pub mod system;

/// Login page path.
pub const LOGIN_URL: &str = "/login";
/// Management landing page path.
pub const MANAGEMENT_INDEX: &str = "/management/index";
