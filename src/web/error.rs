use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::auth::AuthError;

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::DuplicateUser => (StatusCode::CONFLICT, "User already exists"),
            Self::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid email or password"),
            Self::InvalidSession => (StatusCode::UNAUTHORIZED, "Invalid or expired session"),
            Self::Store(_) | Self::RandomnessUnavailable(_) | Self::Hashing(_) => {
                tracing::error!("Auth request failed: {self}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
