use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;

use super::auth;
use super::AppState;

/// Credential endpoints. These run before a CSRF cookie exists (register,
/// login) or must always succeed (logout), so they skip the CSRF check.
pub const CSRF_EXEMPT_PATHS: [&str; 3] = ["/auth/register", "/auth/login", "/auth/logout"];

/// Create the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/healthz", get(health))
}

async fn health() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}
