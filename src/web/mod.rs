mod auth;
mod error;
mod routes;

pub use routes::CSRF_EXEMPT_PATHS;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::FromRef;
use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::middleware;
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::{csrf_protect, AuthService, CookiePolicy, CsrfPolicy, CSRF_HEADER_NAME};
use crate::config::Config;
use crate::db::Database;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub cookies: CookiePolicy,
    pub csrf: Arc<CsrfPolicy>,
}

impl AppState {
    /// Wire the auth service and cookie policy for a database.
    #[must_use]
    pub fn new(config: &Config, db: Database) -> Self {
        Self {
            auth: AuthService::new(Arc::new(db)),
            cookies: config.cookie_policy(),
            csrf: Arc::new(CsrfPolicy::with_exempt_paths(CSRF_EXEMPT_PATHS)),
        }
    }
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

/// Start the web server and run until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the server fails to start.
pub async fn serve(
    config: Config,
    db: Database,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.web_host, config.web_port)
        .parse()
        .context("Invalid web server address")?;

    let cors = cors_layer(&config.cors_allowed_origins)?;
    let state = AppState::new(&config, db);
    let app = create_app(state).layer(cors);

    info!(addr = %addr, secure_cookies = config.cookie_secure, "Starting HTTP web server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind web server")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("Web server error")?;

    Ok(())
}

/// Create the main application router.
///
/// Every mutating request outside [`CSRF_EXEMPT_PATHS`] must pass the
/// double-submit check.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(routes::router())
        .layer(middleware::from_fn_with_state(
            state.csrf.clone(),
            csrf_protect,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for the browser client: credentialed requests from the configured
/// origins, with the CSRF header allowed through.
///
/// # Errors
///
/// Returns an error if an origin is `*` or not a valid header value.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    if origins.iter().any(|o| o == "*") {
        anyhow::bail!("Wildcard CORS origin cannot be used with credentials");
    }

    let origins = origins
        .iter()
        .map(|o| HeaderValue::from_str(o).with_context(|| format!("Invalid CORS origin: {o}")))
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
            HeaderName::from_static(CSRF_HEADER_NAME),
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(12 * 60 * 60)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_rejects_invalid_origin() {
        assert!(cors_layer(&["http://localhost:5173".to_string()]).is_ok());
        assert!(cors_layer(&["bad\norigin".to_string()]).is_err());
    }

    #[test]
    fn test_cors_layer_rejects_wildcard_origin() {
        assert!(cors_layer(&["*".to_string()]).is_err());
        assert!(cors_layer(&["http://localhost:5173".to_string(), "*".to_string()]).is_err());
    }
}
