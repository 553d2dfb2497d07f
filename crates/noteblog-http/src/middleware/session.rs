//! Session middleware: resolves (or issues) the visitor's session once per
//! request before any handler runs.

use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, header};
use axum::middleware::Next;
use axum::response::Response;

use noteblog_service::cookie::{InboundCookies, SetCookie};
use noteblog_service::types::{SessionId, UserSnapshot};

use crate::state::AppState;

/// The session resolved for the current request, stored in the request
/// extensions.
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub id: SessionId,
    /// User bound to the session when it was resolved.
    pub user: Option<UserSnapshot>,
    /// The client sent a session cookie, even one naming an unknown,
    /// expired or malformed session.
    pub cookie_sent: bool,
    /// Inbound cookies, with the session cookie pointing at `id`.
    pub cookies: InboundCookies,
}

/// Resolves the session cookie through the session context and exposes the
/// result to handlers as a [`CurrentSession`] extension.
///
/// Never attaches a user: users are bound to a session only by a successful
/// login. When a new session is issued, its `Set-Cookie` is appended to the
/// response unless the handler already set the session cookie.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let ctx = state.context();
    let mut cookies = inbound_cookies(req.headers());
    let cookie_sent = cookies.contains(ctx.cookie_name());
    let resolution = ctx.resolve_or_create(&cookies);

    if resolution.is_new() {
        cookies.set_first(ctx.cookie_name(), resolution.id.as_str());
    }
    req.extensions_mut().insert(CurrentSession {
        id: resolution.id.clone(),
        user: resolution.user,
        cookie_sent,
        cookies,
    });

    let mut response = next.run(req).await;
    if let Some(cookie) = &resolution.set_cookie
        && !sets_cookie(response.headers(), &cookie.name)
    {
        append_set_cookie(response.headers_mut(), cookie);
    }
    response
}

/// Whether a handler already emitted a `Set-Cookie` for `name`. Login and
/// logout replace or remove the session cookie themselves, and theirs wins.
fn sets_cookie(headers: &HeaderMap, name: &str) -> bool {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.strip_prefix(name).is_some_and(|rest| rest.starts_with('=')))
}

/// Collects every `Cookie` header. Values that are not visible ASCII are
/// ignored.
pub fn inbound_cookies(headers: &HeaderMap) -> InboundCookies {
    InboundCookies::parse(
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok()),
    )
}

/// Appends a `Set-Cookie` header for `cookie`.
pub fn append_set_cookie(headers: &mut HeaderMap, cookie: &SetCookie) {
    match HeaderValue::from_str(&cookie.to_string()) {
        Ok(value) => {
            headers.append(header::SET_COOKIE, value);
        }
        Err(e) => tracing::error!(cookie = %cookie.name, "unencodable Set-Cookie header: {e}"),
    }
}
