use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::SqlitePool;

use super::models::{Session, SessionWithUser, User};

/// Format a timestamp the way every `*_at` column stores it.
///
/// Fixed-width UTC with microseconds, so string order matches time order.
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

// ========== Users ==========

/// Create a new user.
pub async fn create_user(pool: &SqlitePool, email: &str, password_hash: &str) -> Result<User> {
    sqlx::query_as(
        r"
        INSERT INTO users (email, password_hash)
        VALUES (?, ?)
        RETURNING id, email, password_hash, created_at
        ",
    )
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await
    .context("Failed to create user")
}

/// Get a user by email.
pub async fn get_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
    sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch user by email")
}

/// Count total users.
pub async fn count_users(pool: &SqlitePool) -> Result<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
        .context("Failed to count users")?;
    Ok(row.0)
}

// ========== Sessions ==========

/// Create a new session.
pub async fn create_session(
    pool: &SqlitePool,
    user_id: i64,
    token: &str,
    expires_at: DateTime<Utc>,
) -> Result<Session> {
    sqlx::query_as(
        r"
        INSERT INTO sessions (user_id, token, expires_at)
        VALUES (?, ?, ?)
        RETURNING id, user_id, token, expires_at, created_at
        ",
    )
    .bind(user_id)
    .bind(token)
    .bind(format_timestamp(expires_at))
    .fetch_one(pool)
    .await
    .context("Failed to create session")
}

/// Get a live session and its owner by token.
/// Sessions whose `expires_at` is not after `now` are treated as absent.
pub async fn get_session_by_token(
    pool: &SqlitePool,
    token: &str,
    now: DateTime<Utc>,
) -> Result<Option<SessionWithUser>> {
    sqlx::query_as(
        r"
        SELECT s.id AS session_id, s.user_id, s.expires_at, u.email AS user_email
        FROM sessions s
        JOIN users u ON u.id = s.user_id
        WHERE s.token = ? AND s.expires_at > ?
        ",
    )
    .bind(token)
    .bind(format_timestamp(now))
    .fetch_optional(pool)
    .await
    .context("Failed to fetch session by token")
}

/// Delete a session. Deleting an unknown token is not an error.
pub async fn delete_session(pool: &SqlitePool, token: &str) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await
        .context("Failed to delete session")?;
    Ok(result.rows_affected())
}

/// Count sessions for a user, expired ones included.
pub async fn count_user_sessions(pool: &SqlitePool, user_id: i64) -> Result<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sessions WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .context("Failed to count user sessions")?;
    Ok(row.0)
}
