//! Cookie codec for the session and remember-me cookies.
//!
//! Transport crates hand over raw `Cookie` header values and attach the
//! rendered [`SetCookie`] instructions to their responses.

use std::fmt;
use std::time::Duration;

use ::cookie::{Cookie, SameSite};

use crate::error::ServiceError;

/// Default name of the session cookie.
pub const DEFAULT_SESSION_COOKIE: &str = "nb_session_id";
/// Remember-me cookie. Only ever deleted here, never set.
pub const REMEMBER_COOKIE: &str = "nb_remember";

/// How the session cookie is issued.
#[derive(Debug, Clone)]
pub struct CookiePolicy {
    name: String,
    /// `None` issues a browser-session cookie.
    max_age: Option<Duration>,
}

impl CookiePolicy {
    /// Builds a policy, rejecting names that cannot appear in a `Set-Cookie`
    /// header.
    pub fn new(name: impl Into<String>, max_age: Option<Duration>) -> Result<Self, ServiceError> {
        let name = name.into();
        if !is_cookie_name(&name) {
            return Err(ServiceError::invalid_configuration(format!(
                "'{name}' is not a valid cookie name"
            )));
        }
        Ok(Self { name, max_age })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_age(&self) -> Option<Duration> {
        self.max_age
    }
}

impl Default for CookiePolicy {
    fn default() -> Self {
        Self {
            name: DEFAULT_SESSION_COOKIE.to_owned(),
            max_age: None,
        }
    }
}

/// RFC 6265 cookie-name: a non-empty token of visible ASCII without separators.
fn is_cookie_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_graphic() && !b"()<>@,;:\\\"/[]?={}".contains(&b))
}

/// Cookies sent by the client, in header order.
#[derive(Debug, Clone, Default)]
pub struct InboundCookies {
    pairs: Vec<(String, String)>,
}

impl InboundCookies {
    /// Parses one or more `Cookie` header values. Pairs that do not parse
    /// (no `=`, empty name) are skipped; surrounding quotes are dropped.
    pub fn parse<'a>(headers: impl IntoIterator<Item = &'a str>) -> Self {
        let pairs = headers
            .into_iter()
            .flat_map(Cookie::split_parse)
            .filter_map(Result::ok)
            .map(|c| (c.name().to_owned(), c.value_trimmed().to_owned()))
            .collect();
        Self { pairs }
    }

    /// Returns the first value sent under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Whether the client sent a cookie called `name`, whatever its value.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Makes `name` resolve to `value`, shadowing whatever the client sent.
    pub fn set_first(&mut self, name: &str, value: &str) {
        self.pairs.insert(0, (name.to_owned(), value.to_owned()));
    }
}

/// Instruction for the transport to emit a `Set-Cookie` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    pub name: String,
    pub value: String,
    pub path: &'static str,
    pub http_only: bool,
    pub max_age: Option<Duration>,
}

impl SetCookie {
    /// The session cookie carrying `value` under `policy`.
    pub fn session(policy: &CookiePolicy, value: &str) -> Self {
        Self {
            name: policy.name.clone(),
            value: value.to_owned(),
            path: "/",
            http_only: true,
            max_age: policy.max_age,
        }
    }

    /// Tells the client to drop the cookie `name`.
    pub fn removal(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            value: String::new(),
            path: "/",
            http_only: true,
            max_age: Some(Duration::ZERO),
        }
    }

    pub fn is_removal(&self) -> bool {
        self.max_age == Some(Duration::ZERO)
    }

    /// The `cookie` crate representation of this instruction.
    pub fn to_cookie(&self) -> Cookie<'static> {
        let mut builder = Cookie::build((self.name.clone(), self.value.clone()))
            .path(self.path)
            .http_only(self.http_only)
            .same_site(SameSite::Lax);
        if let Some(max_age) = self.max_age {
            let secs = i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX);
            builder = builder.max_age(::cookie::time::Duration::seconds(secs));
        }
        builder.build()
    }
}

impl fmt::Display for SetCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_cookie().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_multiple_headers_first_wins() {
        let cookies = InboundCookies::parse([
            "theme=dark; nb_session_id=abc",
            "nb_session_id=def; lang=\"zh\"",
        ]);
        assert_eq!(cookies.get("nb_session_id"), Some("abc"));
        assert_eq!(cookies.get("theme"), Some("dark"));
        assert_eq!(cookies.get("lang"), Some("zh"));
        assert_eq!(cookies.get("missing"), None);
    }

    #[test]
    fn test_parse_skips_malformed_pairs() {
        let cookies = InboundCookies::parse(["garbage; =nope;  ; ok = yes "]);
        assert_eq!(cookies.get("ok"), Some("yes"));
        assert_eq!(cookies.get(""), None);
        assert!(InboundCookies::parse(["no-equals-here"]).is_empty());
    }

    #[test]
    fn test_set_first_shadows_client_value() {
        let mut cookies = InboundCookies::parse(["nb_session_id=stale"]);
        cookies.set_first("nb_session_id", "fresh");
        assert_eq!(cookies.get("nb_session_id"), Some("fresh"));
    }

    #[test]
    fn test_session_cookie_rendering() {
        let header = SetCookie::session(&CookiePolicy::default(), "abc").to_string();
        assert!(header.starts_with("nb_session_id=abc;"));
        let parsed = Cookie::parse(header).unwrap();
        assert_eq!(parsed.path(), Some("/"));
        assert_eq!(parsed.http_only(), Some(true));
        assert_eq!(parsed.same_site(), Some(SameSite::Lax));
        assert_eq!(parsed.max_age(), None);

        let policy = CookiePolicy::new("sid", Some(Duration::from_secs(3600))).unwrap();
        let rendered = SetCookie::session(&policy, "xyz").to_cookie();
        assert_eq!(rendered.name_value(), ("sid", "xyz"));
        assert_eq!(rendered.max_age(), Some(::cookie::time::Duration::hours(1)));
        assert_eq!(rendered.same_site(), Some(SameSite::Lax));
        assert_eq!(rendered.http_only(), Some(true));
    }

    #[test]
    fn test_removal_cookie() {
        let removal = SetCookie::removal(REMEMBER_COOKIE);
        assert!(removal.is_removal());

        let parsed = Cookie::parse(removal.to_string()).unwrap();
        assert_eq!(parsed.name(), REMEMBER_COOKIE);
        assert_eq!(parsed.value(), "");
        assert_eq!(parsed.path(), Some("/"));
        assert_eq!(parsed.max_age(), Some(::cookie::time::Duration::ZERO));
    }

    #[test]
    fn test_policy_rejects_unusable_names() {
        for bad in ["", "nb session", "nb;sid", "sid=1", "séance", "\"\""] {
            assert!(
                matches!(
                    CookiePolicy::new(bad, None),
                    Err(ServiceError::InvalidConfiguration(_))
                ),
                "{bad:?} should be rejected"
            );
        }
        assert_eq!(CookiePolicy::new("nb_session_id", None).unwrap().name(), "nb_session_id");
        assert!(CookiePolicy::new("__Host-sid", None).is_ok());
    }

    #[test]
    fn test_contains_ignores_value() {
        let cookies = InboundCookies::parse(["nb_session_id=; theme=dark"]);
        assert!(cookies.contains("nb_session_id"));
        assert!(!cookies.contains("nb_remember"));
    }
}
