//! Double-submit-cookie CSRF protection.
//!
//! At login the server sets a random, script-readable `csrf_token` cookie.
//! Mutating requests must echo that value in the `X-CSRF-Token` header. A
//! cross-site page can make the browser send the cookie but cannot read it,
//! so it cannot produce the matching header. Nothing is stored server-side.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::cookies::{cookie_value, CSRF_COOKIE_NAME, CSRF_HEADER_NAME};
use super::token::generate_session_token;
use super::AuthError;

/// Generate a CSRF token. Same shape and source as a session token.
pub fn generate_csrf_token() -> Result<String, AuthError> {
    generate_session_token()
}

/// Which requests the CSRF middleware lets through unchecked.
#[derive(Debug, Clone, Default)]
pub struct CsrfPolicy {
    /// Exact request paths exempt from the check.
    pub exempt_paths: Vec<String>,
}

impl CsrfPolicy {
    #[must_use]
    pub fn with_exempt_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self {
            exempt_paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn is_exempt(&self, path: &str) -> bool {
        self.exempt_paths.iter().any(|p| p == path)
    }
}

/// Why a mutating request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsrfRejection {
    MissingCookie,
    MissingHeader,
    Mismatch,
}

impl CsrfRejection {
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::MissingCookie => "CSRF token missing from cookie",
            Self::MissingHeader => "CSRF token missing from header",
            Self::Mismatch => "CSRF token mismatch",
        }
    }
}

impl IntoResponse for CsrfRejection {
    fn into_response(self) -> Response {
        (StatusCode::FORBIDDEN, Json(json!({ "error": self.message() }))).into_response()
    }
}

/// Methods used only for reads; these bypass the check.
#[must_use]
pub fn is_safe_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Check the double-submit pair on a request.
///
/// Safe methods always pass. Otherwise both the cookie and the header must be
/// present and byte-identical.
pub fn check_double_submit(method: &Method, headers: &HeaderMap) -> Result<(), CsrfRejection> {
    if is_safe_method(method) {
        return Ok(());
    }

    let cookie_token =
        cookie_value(headers, CSRF_COOKIE_NAME).ok_or(CsrfRejection::MissingCookie)?;

    let header_token = headers
        .get(CSRF_HEADER_NAME)
        .map(|h| h.as_bytes())
        .filter(|h| !h.is_empty())
        .ok_or(CsrfRejection::MissingHeader)?;

    if cookie_token.as_bytes() != header_token {
        return Err(CsrfRejection::Mismatch);
    }

    Ok(())
}

/// Axum middleware enforcing [`check_double_submit`] outside exempt paths.
pub async fn csrf_protect(
    State(policy): State<Arc<CsrfPolicy>>,
    request: Request,
    next: Next,
) -> Response {
    if !policy.is_exempt(request.uri().path()) {
        if let Err(rejection) = check_double_submit(request.method(), request.headers()) {
            tracing::debug!(
                method = %request.method(),
                path = %request.uri().path(),
                reason = rejection.message(),
                "Rejected request failing CSRF check"
            );
            return rejection.into_response();
        }
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderValue};

    fn headers(cookie: Option<&'static str>, csrf_header: Option<&'static str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = cookie {
            headers.insert(header::COOKIE, HeaderValue::from_static(cookie));
        }
        if let Some(value) = csrf_header {
            headers.insert(CSRF_HEADER_NAME, HeaderValue::from_static(value));
        }
        headers
    }

    #[test]
    fn test_generate_csrf_token() {
        let token1 = generate_csrf_token().unwrap();
        let token2 = generate_csrf_token().unwrap();

        assert_eq!(token1.len(), 64);
        assert_ne!(token1, token2);
    }

    #[test]
    fn test_safe_methods_bypass() {
        let empty = headers(None, None);
        for method in [Method::GET, Method::HEAD, Method::OPTIONS] {
            assert_eq!(check_double_submit(&method, &empty), Ok(()));
        }
        let mismatched = headers(Some("csrf_token=a"), Some("b"));
        assert_eq!(check_double_submit(&Method::GET, &mismatched), Ok(()));
    }

    #[test]
    fn test_missing_cookie_rejected() {
        let h = headers(Some("session_token=s"), Some("abc"));
        for method in [Method::POST, Method::PUT, Method::PATCH, Method::DELETE] {
            assert_eq!(
                check_double_submit(&method, &h),
                Err(CsrfRejection::MissingCookie)
            );
        }
    }

    #[test]
    fn test_missing_header_rejected() {
        let h = headers(Some("csrf_token=abc"), None);
        assert_eq!(
            check_double_submit(&Method::POST, &h),
            Err(CsrfRejection::MissingHeader)
        );

        let h = headers(Some("csrf_token=abc"), Some(""));
        assert_eq!(
            check_double_submit(&Method::POST, &h),
            Err(CsrfRejection::MissingHeader)
        );
    }

    #[test]
    fn test_mismatch_rejected() {
        let h = headers(Some("csrf_token=abc"), Some("abd"));
        assert_eq!(
            check_double_submit(&Method::DELETE, &h),
            Err(CsrfRejection::Mismatch)
        );

        let h = headers(Some("csrf_token=abc"), Some("ABC"));
        assert_eq!(
            check_double_submit(&Method::POST, &h),
            Err(CsrfRejection::Mismatch)
        );
    }

    #[test]
    fn test_matching_pair_allowed() {
        let h = headers(Some("session_token=s; csrf_token=abc123"), Some("abc123"));
        assert_eq!(check_double_submit(&Method::POST, &h), Ok(()));
    }

    #[test]
    fn test_exempt_paths() {
        let policy = CsrfPolicy::with_exempt_paths(["/auth/login"]);
        assert!(policy.is_exempt("/auth/login"));
        assert!(!policy.is_exempt("/auth/login/extra"));
        assert!(!CsrfPolicy::default().is_exempt("/auth/login"));
    }
}
