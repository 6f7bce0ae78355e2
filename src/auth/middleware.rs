use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::cookies::{cookie_value, SESSION_COOKIE_NAME};
use super::{AuthError, AuthService, AuthUser};

/// Why a request could not be tied to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRejection {
    MissingCookie,
    InvalidSession,
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        let message = match self {
            Self::MissingCookie => "Authentication required",
            Self::InvalidSession => "Invalid or expired session",
        };
        (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response()
    }
}

/// Resolve the request's session cookie to a user with a single store lookup.
async fn resolve_user(parts: &Parts, auth: &AuthService) -> Result<AuthUser, SessionRejection> {
    let token =
        cookie_value(&parts.headers, SESSION_COOKIE_NAME).ok_or(SessionRejection::MissingCookie)?;

    match auth.validate_session(token).await {
        Ok(user) => Ok(user),
        Err(AuthError::InvalidSession) => Err(SessionRejection::InvalidSession),
        Err(e) => {
            tracing::error!("Session validation failed: {e}");
            Err(SessionRejection::InvalidSession)
        }
    }
}

/// Current authenticated user (if any).
/// Use this extractor when authentication is optional.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<AuthUser>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
    AuthService: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthService::from_ref(state);
        Ok(MaybeUser(resolve_user(parts, &auth).await.ok()))
    }
}

/// Current authenticated user (required).
/// Use this extractor when authentication is mandatory.
/// Returns 401 Unauthorized if not logged in.
#[derive(Debug, Clone)]
pub struct RequireUser(pub AuthUser);

#[async_trait]
impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
    AuthService: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthService::from_ref(state);
        resolve_user(parts, &auth)
            .await
            .map(RequireUser)
            .map_err(IntoResponse::into_response)
    }
}
