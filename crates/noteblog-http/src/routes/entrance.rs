//! Entrance pages: index, registration, login, logout and the management
//! landing page.
//!
//! Templating is not part of this server; page handlers answer with a
//! [`ViewResponse`] naming the view, or with a redirect.

use axum::extract::{Extension, Form, Json, Query, State};
use axum::response::{IntoResponse, Redirect, Response};

use noteblog_service::accounts::LoginKind;
use noteblog_service::error::ServiceError;
use noteblog_service::registry::USER_ROLE_ID;

use crate::error::ApiError;
use crate::middleware::session::{CurrentSession, append_set_cookie};
use crate::state::AppState;
use crate::types::{ActionResponse, LoginForm, LogoutQuery, RegistrationForm, ViewResponse};

use super::{LOGIN_URL, MANAGEMENT_INDEX};

const MANAGEMENT_VIEW: &str = "management/index";

/// Site index. Exposes the session's user to the view, if any.
pub async fn index(Extension(session): Extension<CurrentSession>) -> Json<ViewResponse> {
    Json(ViewResponse::new("index").with_user(session.user))
}

pub async fn registration_page() -> Json<ViewResponse> {
    Json(ViewResponse::new("registration"))
}

/// Creates an account with the ordinary user role.
///
/// Validation failures are reported in the body, not as HTTP errors.
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegistrationForm>,
) -> Result<Json<ActionResponse>, ApiError> {
    let role_id = state.context().registry_integer(USER_ROLE_ID)?;

    match state.accounts().register(form.into(), role_id) {
        Ok(_) => Ok(Json(ActionResponse::ok("registered", Some(LOGIN_URL)))),
        Err(ServiceError::BadRequest(msg) | ServiceError::Conflict(msg)) => {
            Ok(Json(ActionResponse::error(msg)))
        }
        Err(e) => Err(e.into()),
    }
}

/// Login page. Anonymous visitors get the form, the webmaster goes to the
/// management page, anyone else already logged in back to the index.
pub async fn login_page(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
) -> Result<Response, ApiError> {
    let ctx = state.context();
    let Some(user) = ctx.current_user(session.id.as_str()) else {
        return Ok(Json(ViewResponse::new("login")).into_response());
    };

    if ctx.is_webmaster(&user)? {
        Ok(Json(ViewResponse::new(MANAGEMENT_VIEW).with_user(Some(user))).into_response())
    } else {
        Ok(Redirect::to("/").into_response())
    }
}

/// Login form submission. Only `simple` (username/password) is supported.
pub async fn login(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    let kind = form.request_type.as_deref().and_then(LoginKind::parse);
    match kind {
        Some(LoginKind::Simple) => {}
        Some(LoginKind::Qq | LoginKind::Wechat) => {
            return Ok(Json(ActionResponse::error("login type not supported")).into_response());
        }
        None => return Ok(Json(ActionResponse::error("unknown login type")).into_response()),
    }

    let user = match state.accounts().authenticate(&form.username, &form.password) {
        Ok(user) => user,
        Err(ServiceError::Unauthorized) => {
            return Ok(
                Json(ActionResponse::error("invalid username or password")).into_response(),
            );
        }
        Err(e) => return Err(e.into()),
    };

    let ctx = state.context();
    let next = if ctx.is_webmaster(&user)? {
        MANAGEMENT_INDEX
    } else {
        "/"
    };
    let resolution = ctx.attach_user(&session.cookies, user);

    let mut response = Json(ActionResponse::ok("login succeeded", Some(next))).into_response();
    if let Some(cookie) = &resolution.set_cookie {
        append_set_cookie(response.headers_mut(), cookie);
    }
    Ok(response)
}

/// Ends the session and clears the remember-me and session cookies.
///
/// Requires the client to have sent a session cookie. One naming a session
/// that has already expired still logs out; only the cookies are cleared.
pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
    Query(query): Query<LogoutQuery>,
) -> Result<Response, ApiError> {
    if !session.cookie_sent {
        return Err(ApiError::bad_request("missing session cookie"));
    }

    // For a stale cookie this drops the session the middleware just issued.
    let removals = state.context().end_session(session.id.as_str());

    let target = match query.from.as_deref() {
        Some(from) if !from.is_empty() => MANAGEMENT_INDEX,
        _ => "/",
    };
    let mut response = Redirect::to(target).into_response();
    for cookie in &removals {
        append_set_cookie(response.headers_mut(), cookie);
    }
    Ok(response)
}

/// Management landing page, webmaster only.
pub async fn management_index(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
) -> Result<Response, ApiError> {
    let ctx = state.context();
    if let Some(user) = ctx.current_user(session.id.as_str())
        && ctx.is_webmaster(&user)?
    {
        return Ok(Json(ViewResponse::new(MANAGEMENT_VIEW).with_user(Some(user))).into_response());
    }
    Ok(Redirect::to(LOGIN_URL).into_response())
}
