//! Startup seeding of roles, the optional webmaster account, and the
//! application registry.

use crate::error::ServiceError;
use crate::password;
use crate::registry::{ApplicationRegistry, USER_ROLE_ID, WEBMASTER_ROLE_ID};
use crate::repository::{NewUser, RoleRepository, UserRepository};

pub const ROLE_MASTER: &str = "ROLE_MASTER";
pub const ROLE_USER: &str = "ROLE_USER";

/// Credentials for a webmaster account created at startup.
#[derive(Debug, Clone)]
pub struct SeedAccount {
    pub username: String,
    pub password: String,
}

/// Ensures the built-in roles exist, creates the webmaster account if
/// requested, and derives the registry values from the role table.
pub fn seed(
    users: &dyn UserRepository,
    roles: &dyn RoleRepository,
    webmaster: Option<&SeedAccount>,
) -> Result<ApplicationRegistry, ServiceError> {
    roles.save(ROLE_MASTER);
    roles.save(ROLE_USER);

    let mut registry = ApplicationRegistry::builder();
    // Only values the role table actually yields are registered; a missing
    // role surfaces as ConfigurationMissing at first use.
    if let Some(role) = roles.find_by_name(ROLE_MASTER) {
        registry.put(WEBMASTER_ROLE_ID, role.id);
    }
    if let Some(role) = roles.find_by_name(ROLE_USER) {
        registry.put(USER_ROLE_ID, role.id);
    }
    let registry = registry.build();

    if let Some(account) = webmaster
        && users.find_by_username(&account.username).is_none()
    {
        let user = users.save(NewUser {
            username: account.username.clone(),
            password_digest: password::digest(&account.password),
            nickname: account.username.clone(),
            default_role_id: registry.integer(WEBMASTER_ROLE_ID)?,
        })?;
        tracing::info!(user_id = user.id, username = %user.username, "webmaster account created");
    }

    tracing::info!(values = registry.len(), "application registry initialised");
    Ok(registry)
}
