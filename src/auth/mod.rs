pub mod cookies;
pub mod csrf;
pub mod error;
pub mod middleware;
pub mod password;
pub mod service;
pub mod token;

pub use cookies::{CookiePolicy, CSRF_COOKIE_NAME, CSRF_HEADER_NAME, SESSION_COOKIE_NAME};
pub use csrf::{check_double_submit, csrf_protect, generate_csrf_token, CsrfPolicy, CsrfRejection};
pub use error::AuthError;
pub use middleware::{MaybeUser, RequireUser, SessionRejection};
pub use password::{hash_password, validate_password_strength, verify_password};
pub use service::{AuthService, AuthUser, LoginOutcome};
pub use token::{generate_session_token, SESSION_DURATION};
