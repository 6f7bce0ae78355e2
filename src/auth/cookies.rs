//! Cookie names, `Cookie` header parsing and `Set-Cookie` construction.

use axum::http::{header, HeaderMap};

/// Session cookie name. HTTP-only.
pub const SESSION_COOKIE_NAME: &str = "session_token";
/// CSRF cookie name. Readable by client script.
pub const CSRF_COOKIE_NAME: &str = "csrf_token";
/// Header the client echoes the CSRF cookie value in.
pub const CSRF_HEADER_NAME: &str = "x-csrf-token";

const COOKIE_PATH: &str = "/";

/// Attributes shared by every auth cookie, fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookiePolicy {
    /// Adds `Secure`. Must be on whenever the app is served over TLS.
    pub secure: bool,
}

impl CookiePolicy {
    /// Build a `Set-Cookie` value.
    ///
    /// A negative `max_age` expires the cookie immediately.
    #[must_use]
    pub fn build(&self, name: &str, value: &str, max_age: i64, http_only: bool) -> String {
        let mut cookie = format!("{name}={value}; Path={COOKIE_PATH}; Max-Age={max_age}");
        if http_only {
            cookie.push_str("; HttpOnly");
        }
        cookie.push_str("; SameSite=Lax");
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    #[must_use]
    pub fn session_cookie(&self, token: &str, max_age: i64) -> String {
        self.build(SESSION_COOKIE_NAME, token, max_age, true)
    }

    /// The CSRF cookie is intentionally not HTTP-only: the client must read it
    /// to copy it into the CSRF header.
    #[must_use]
    pub fn csrf_cookie(&self, token: &str, max_age: i64) -> String {
        self.build(CSRF_COOKIE_NAME, token, max_age, false)
    }

    /// `Set-Cookie` values that clear both auth cookies.
    #[must_use]
    pub fn clear_cookies(&self) -> [String; 2] {
        [
            self.build(SESSION_COOKIE_NAME, "", -1, true),
            self.build(CSRF_COOKIE_NAME, "", -1, false),
        ]
    }
}

/// Read a cookie value from the request headers.
///
/// Empty values count as absent.
#[must_use]
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|cookie| {
            let (key, value) = cookie.trim().split_once('=')?;
            (key == name).then_some(value)
        })
        .filter(|value| !value.is_empty())
}
