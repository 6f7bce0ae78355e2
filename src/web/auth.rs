use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse, Response},
    Json,
};
use regex::Regex;
use serde::Deserialize;
use serde_json::json;

use crate::auth::cookies::{cookie_value, SESSION_COOKIE_NAME};
use crate::auth::{generate_csrf_token, validate_password_strength, RequireUser};
use crate::web::AppState;

static EMAIL_PATTERN: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Register and login request body.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

fn bad_request(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": message.into() })),
    )
        .into_response()
}

fn parse_body(
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<CredentialsRequest, Response> {
    body.map(|Json(b)| b)
        .map_err(|e| bad_request(format!("Invalid request: {}", e.body_text())))
}

/// Boundary checks for registration input.
fn validate_registration(req: &CredentialsRequest) -> Result<(), String> {
    if !EMAIL_PATTERN.is_match(&req.email) {
        return Err("A valid email address is required".to_string());
    }
    validate_password_strength(&req.password)
}

/// POST /auth/register - Create an account.
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Response {
    let req = match parse_body(body) {
        Ok(req) => req,
        Err(response) => return response,
    };

    if let Err(message) = validate_registration(&req) {
        return bad_request(message);
    }

    match state.auth.register(&req.email, &req.password).await {
        Ok(user) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "User registered successfully",
                "user": user,
            })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /auth/login - Check credentials, set session and CSRF cookies.
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Response {
    let req = match parse_body(body) {
        Ok(req) => req,
        Err(response) => return response,
    };

    if req.email.is_empty() || req.password.is_empty() {
        return bad_request("Email and password are required");
    }
    if !EMAIL_PATTERN.is_match(&req.email) {
        return bad_request("A valid email address is required");
    }

    // Generated first so a randomness failure cannot leave an orphaned session.
    let csrf_token = match generate_csrf_token() {
        Ok(token) => token,
        Err(e) => return e.into_response(),
    };

    let outcome = match state.auth.login(&req.email, &req.password).await {
        Ok(outcome) => outcome,
        Err(e) => return e.into_response(),
    };

    let max_age = state.auth.session_duration().num_seconds();
    let cookies = AppendHeaders([
        (
            header::SET_COOKIE,
            state.cookies.session_cookie(&outcome.session_token, max_age),
        ),
        (
            header::SET_COOKIE,
            state.cookies.csrf_cookie(&csrf_token, max_age),
        ),
    ]);

    (
        StatusCode::OK,
        cookies,
        Json(json!({
            "message": "Login successful",
            "user": outcome.user,
        })),
    )
        .into_response()
}

/// POST /auth/logout - Invalidate the session and clear cookies.
///
/// Always succeeds: a failed delete is logged and the cookies are cleared anyway.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let message = match cookie_value(&headers, SESSION_COOKIE_NAME) {
        Some(token) => {
            if let Err(e) = state.auth.logout(token).await {
                tracing::warn!("Failed to delete session on logout: {e}");
            }
            "Logged out successfully"
        }
        None => "Already logged out",
    };

    let [session_cookie, csrf_cookie] = state.cookies.clear_cookies();
    (
        StatusCode::OK,
        AppendHeaders([
            (header::SET_COOKIE, session_cookie),
            (header::SET_COOKIE, csrf_cookie),
        ]),
        Json(json!({ "message": message })),
    )
        .into_response()
}

/// GET /auth/me - The user behind the session cookie.
pub async fn me(RequireUser(user): RequireUser) -> Response {
    Json(json!({ "user": user })).into_response()
}
