//! Registration, login, logout and session validation.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::{debug, info};

use super::password::{hash_password, verify_password};
use super::token::{generate_session_token, SESSION_DURATION};
use super::AuthError;
use crate::db::{CredentialStore, SessionWithUser, StoreError, User};

/// Public view of a user. The only user shape that leaves the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}

impl From<SessionWithUser> for AuthUser {
    fn from(row: SessionWithUser) -> Self {
        Self {
            id: row.user_id,
            email: row.user_email,
        }
    }
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: AuthUser,
    pub session_token: String,
}

/// Auth service over a shared credential store.
///
/// Holds no mutable state; clones share the store.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    session_duration: Duration,
}

impl AuthService {
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self::with_session_duration(store, SESSION_DURATION)
    }

    #[must_use]
    pub fn with_session_duration(
        store: Arc<dyn CredentialStore>,
        session_duration: Duration,
    ) -> Self {
        Self {
            store,
            session_duration,
        }
    }

    #[must_use]
    pub const fn session_duration(&self) -> Duration {
        self.session_duration
    }

    /// Create an account.
    ///
    /// The existence check and insert are separate statements; a concurrent
    /// registration that slips between them hits the store's uniqueness
    /// constraint and is reported as [`AuthError::DuplicateUser`] too.
    pub async fn register(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        if self.store.get_user_by_email(email).await?.is_some() {
            return Err(AuthError::DuplicateUser);
        }

        let password_hash = hash_password(password)?;

        let user = match self.store.create_user(email, &password_hash).await {
            Ok(user) => user,
            Err(StoreError::Conflict) => return Err(AuthError::DuplicateUser),
            Err(e) => return Err(e.into()),
        };

        info!(user_id = user.id, "Registered new user");
        Ok(user.into())
    }

    /// Check credentials and open a new session.
    ///
    /// Unknown email and wrong password produce the same error.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let Some(user) = self.store.get_user_by_email(email).await? else {
            debug!("Login rejected: invalid credentials");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(&user.password_hash, password) {
            debug!("Login rejected: invalid credentials");
            return Err(AuthError::InvalidCredentials);
        }

        let session_token = generate_session_token()?;
        let expires_at = Utc::now() + self.session_duration;

        self.store
            .create_session(user.id, &session_token, expires_at)
            .await?;

        info!(user_id = user.id, "User logged in");
        Ok(LoginOutcome {
            user: user.into(),
            session_token,
        })
    }

    /// Delete the session for `token`. Idempotent.
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        self.store.delete_session(token).await?;
        Ok(())
    }

    /// Resolve a session token to its user. Pure read; expiry is never extended.
    pub async fn validate_session(&self, token: &str) -> Result<AuthUser, AuthError> {
        self.store
            .get_session_by_token(token)
            .await?
            .map(AuthUser::from)
            .ok_or(AuthError::InvalidSession)
    }
}
