//! Server configuration via CLI args and environment variables.

use clap::Parser;

use noteblog_service::ServiceConfig;
use noteblog_service::bootstrap::SeedAccount;
use noteblog_service::cookie::DEFAULT_SESSION_COOKIE;

/// Session and application-context server for the Noteblog CMS.
#[derive(Parser, Debug, Clone)]
#[command(name = "noteblog-server", version, about)]
pub struct Config {
    /// Bind address.
    #[arg(long, default_value = "0.0.0.0", env = "NOTEBLOG_HOST")]
    pub host: String,

    /// Bind port.
    #[arg(long, default_value_t = 8080, env = "NOTEBLOG_PORT")]
    pub port: u16,

    /// Idle time in seconds after which a session expires.
    #[arg(long, default_value_t = 1800, env = "NOTEBLOG_SESSION_TTL")]
    pub session_ttl: u64,

    /// Seconds between expired-session sweeps.
    #[arg(long, default_value_t = 60, env = "NOTEBLOG_EVICTION_INTERVAL")]
    pub eviction_interval: u64,

    /// Name of the session cookie.
    #[arg(long, default_value = DEFAULT_SESSION_COOKIE, env = "NOTEBLOG_SESSION_COOKIE")]
    pub session_cookie: String,

    /// Max-Age of the session cookie in seconds. Omit for a browser-session cookie.
    #[arg(long, env = "NOTEBLOG_COOKIE_MAX_AGE")]
    pub cookie_max_age: Option<u64>,

    /// CORS allowed origins (comma-separated). Empty for no CORS.
    #[arg(long, env = "NOTEBLOG_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Vec<String>,

    /// Webmaster account created at startup if it does not exist.
    #[arg(long, env = "NOTEBLOG_ADMIN_USER", requires = "admin_password")]
    pub admin_user: Option<String>,

    /// Password for the startup webmaster account.
    #[arg(long, env = "NOTEBLOG_ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,

    /// Log level.
    #[arg(long, default_value = "info", env = "NOTEBLOG_LOG_LEVEL")]
    pub log_level: String,

    /// Log format: "pretty" or "json".
    #[arg(long, default_value = "pretty", env = "NOTEBLOG_LOG_FORMAT")]
    pub log_format: String,
}

impl Config {
    /// Parses configuration from CLI args and env vars.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Extracts the service-layer subset of the configuration.
    pub fn service_config(&self) -> ServiceConfig {
        let webmaster = match (&self.admin_user, &self.admin_password) {
            (Some(username), Some(password)) => Some(SeedAccount {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => None,
        };

        ServiceConfig {
            session_ttl: self.session_ttl,
            session_cookie: self.session_cookie.clone(),
            cookie_max_age: self.cookie_max_age,
            webmaster,
        }
    }
}
