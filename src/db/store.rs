//! Typed credential-store contract consumed by the auth service.
//!
//! The store reports only storage outcomes: a row, no row, a uniqueness
//! conflict, or a backend failure. Mapping those to domain errors is the
//! auth service's job.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use super::models::{Session, SessionWithUser, User};
use super::{queries, Database};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("record already exists")]
    Conflict,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a user. A duplicate email yields [`StoreError::Conflict`].
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn create_session(
        &self,
        user_id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Session, StoreError>;

    /// Look up a session and its owner. Expired sessions are reported as absent.
    async fn get_session_by_token(&self, token: &str)
        -> Result<Option<SessionWithUser>, StoreError>;

    /// Delete a session. Unknown tokens succeed.
    async fn delete_session(&self, token: &str) -> Result<(), StoreError>;
}

/// Classify a failed write, turning SQLite UNIQUE violations into conflicts.
fn classify(err: anyhow::Error) -> StoreError {
    let unique_violation = err
        .downcast_ref::<sqlx::Error>()
        .and_then(sqlx::Error::as_database_error)
        .is_some_and(|db_err| db_err.is_unique_violation());

    if unique_violation {
        StoreError::Conflict
    } else {
        StoreError::Backend(err)
    }
}

#[async_trait]
impl CredentialStore for Database {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        queries::create_user(self.pool(), email, password_hash)
            .await
            .map_err(classify)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(queries::get_user_by_email(self.pool(), email).await?)
    }

    async fn create_session(
        &self,
        user_id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Session, StoreError> {
        queries::create_session(self.pool(), user_id, token, expires_at)
            .await
            .map_err(classify)
    }

    async fn get_session_by_token(
        &self,
        token: &str,
    ) -> Result<Option<SessionWithUser>, StoreError> {
        Ok(queries::get_session_by_token(self.pool(), token, Utc::now()).await?)
    }

    async fn delete_session(&self, token: &str) -> Result<(), StoreError> {
        queries::delete_session(self.pool(), token).await?;
        Ok(())
    }
}
