//! Request and response types for the HTTP API.

use serde::{Deserialize, Serialize};

use noteblog_service::accounts::Registration;
use noteblog_service::types::UserSnapshot;

/// Page decision returned in place of a rendered template.
#[derive(Debug, Serialize)]
pub struct ViewResponse {
    /// Template the page would render (e.g. "login", "management/index").
    pub view: String,
    /// Logged-in user exposed to the view model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub su: Option<UserSnapshot>,
}

impl ViewResponse {
    pub fn new(view: &str) -> Self {
        Self {
            view: view.to_owned(),
            su: None,
        }
    }

    pub fn with_user(mut self, user: Option<UserSnapshot>) -> Self {
        self.su = user;
        self
    }
}

/// Outcome of a form submission (login, registration).
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub code: u16,
    pub message: String,
    /// Where the client should go next, if anywhere.
    pub data: Option<String>,
}

impl ActionResponse {
    pub fn ok(message: &str, next: Option<&str>) -> Self {
        Self {
            code: 200,
            message: message.to_owned(),
            data: next.map(str::to_owned),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            code: 500,
            message: message.into(),
            data: None,
        }
    }
}

/// Registration form fields.
#[derive(Debug, Default, Deserialize)]
pub struct RegistrationForm {
    #[serde(rename = "bmyName", default)]
    pub username: String,
    #[serde(rename = "bmyPass", default)]
    pub password: String,
    #[serde(default)]
    pub nickname: Option<String>,
}

impl From<RegistrationForm> for Registration {
    fn from(form: RegistrationForm) -> Self {
        Self {
            username: form.username,
            password: form.password,
            nickname: form.nickname,
        }
    }
}

/// Login form fields.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(rename = "requestType", default)]
    pub request_type: Option<String>,
    #[serde(rename = "bmyName", default)]
    pub username: String,
    #[serde(rename = "bmyPass", default)]
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LogoutQuery {
    #[serde(default)]
    pub from: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub active_sessions: usize,
}
