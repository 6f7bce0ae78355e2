/// A registered account.
///
/// Carries the password digest, so it is deliberately not `Serialize`;
/// anything crossing the HTTP boundary goes through [`crate::auth::AuthUser`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub created_at: String,
}

/// A login session keyed by its opaque bearer token.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    pub id: i64,
    pub user_id: i64,
    pub token: String,
    pub expires_at: String,
    pub created_at: String,
}

/// A live session joined with the public fields of its owner.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionWithUser {
    pub session_id: i64,
    pub user_id: i64,
    pub expires_at: String,
    pub user_email: String,
}
