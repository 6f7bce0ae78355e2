//! Integration tests for the auth service over the SQLite credential store.

use std::sync::Arc;

use chrono::{Duration, Utc};
use session_auth::auth::{verify_password, AuthError, AuthService};
use session_auth::db::{
    count_user_sessions, count_users, create_session, delete_session, get_session_by_token,
    get_user_by_email, CredentialStore, Database, StoreError,
};
use tempfile::TempDir;

async fn setup_test_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let db = Database::new(&db_path)
        .await
        .expect("Failed to create database");
    (db, temp_dir)
}

fn service(db: &Database) -> AuthService {
    AuthService::new(Arc::new(db.clone()))
}

#[tokio::test]
async fn test_store_create_and_get_user() {
    let (db, _temp_dir) = setup_test_db().await;

    let user = db
        .create_user("user@test.local", "digest")
        .await
        .expect("Failed to create user");
    assert_eq!(user.email, "user@test.local");

    let fetched = db
        .get_user_by_email("user@test.local")
        .await
        .expect("Failed to query")
        .expect("User not found");
    assert_eq!(fetched.id, user.id);
    assert_eq!(fetched.password_hash, "digest");

    let missing = db
        .get_user_by_email("nobody@test.local")
        .await
        .expect("Failed to query");
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_store_duplicate_email_is_conflict() {
    let (db, _temp_dir) = setup_test_db().await;

    db.create_user("user@test.local", "digest")
        .await
        .expect("Failed to create user");

    let err = db
        .create_user("user@test.local", "other")
        .await
        .expect_err("Duplicate insert should fail");
    assert!(matches!(err, StoreError::Conflict));
}

#[tokio::test]
async fn test_store_email_match_is_exact() {
    let (db, _temp_dir) = setup_test_db().await;

    db.create_user("user@test.local", "digest")
        .await
        .expect("Failed to create user");

    let upper = get_user_by_email(db.pool(), "USER@test.local")
        .await
        .expect("Failed to query");
    assert!(upper.is_none());
}

#[tokio::test]
async fn test_expired_session_is_not_returned() {
    let (db, _temp_dir) = setup_test_db().await;
    let user = db
        .create_user("user@test.local", "digest")
        .await
        .expect("Failed to create user");

    let past = Utc::now() - Duration::minutes(1);
    create_session(db.pool(), user.id, "expired-token", past)
        .await
        .expect("Failed to create session");

    let found = get_session_by_token(db.pool(), "expired-token", Utc::now())
        .await
        .expect("Failed to query");
    assert!(found.is_none());

    // The row is still there; it is just inert.
    assert_eq!(count_user_sessions(db.pool(), user.id).await.unwrap(), 1);

    let an_hour_earlier = past - Duration::hours(1);
    let before_expiry = get_session_by_token(db.pool(), "expired-token", an_hour_earlier)
        .await
        .expect("Failed to query");
    assert_eq!(before_expiry.map(|s| s.user_id), Some(user.id));
}

#[tokio::test]
async fn test_delete_session_is_idempotent() {
    let (db, _temp_dir) = setup_test_db().await;
    let user = db
        .create_user("user@test.local", "digest")
        .await
        .expect("Failed to create user");

    create_session(db.pool(), user.id, "tok", Utc::now() + Duration::days(1))
        .await
        .expect("Failed to create session");

    assert_eq!(delete_session(db.pool(), "tok").await.unwrap(), 1);
    assert_eq!(delete_session(db.pool(), "tok").await.unwrap(), 0);
    db.delete_session("never-existed")
        .await
        .expect("Deleting an unknown token should succeed");
}

#[tokio::test]
async fn test_register_stores_argon2_digest() {
    let (db, _temp_dir) = setup_test_db().await;
    let auth = service(&db);

    let user = auth
        .register("user@test.local", "Pass1234!")
        .await
        .expect("Failed to register");
    assert_eq!(user.email, "user@test.local");

    let stored = get_user_by_email(db.pool(), "user@test.local")
        .await
        .unwrap()
        .unwrap();
    assert_ne!(stored.password_hash, "Pass1234!");
    assert!(stored.password_hash.starts_with("$argon2id$"));
    assert!(verify_password(&stored.password_hash, "Pass1234!"));
}

#[tokio::test]
async fn test_register_twice_is_duplicate() {
    let (db, _temp_dir) = setup_test_db().await;
    let auth = service(&db);

    auth.register("user@test.local", "Pass1234!")
        .await
        .expect("Failed to register");
    let err = auth
        .register("user@test.local", "Pass1234!")
        .await
        .expect_err("Second registration should fail");

    assert!(matches!(err, AuthError::DuplicateUser));
    assert_eq!(count_users(db.pool()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_concurrent_registration_creates_one_user() {
    let (db, _temp_dir) = setup_test_db().await;
    let auth = service(&db);

    let (a, b) = tokio::join!(
        auth.register("race@test.local", "Pass1234!"),
        auth.register("race@test.local", "Pass1234!"),
    );

    let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(successes, 1);
    assert!(
        matches!(a, Err(AuthError::DuplicateUser)) || matches!(b, Err(AuthError::DuplicateUser))
    );
    assert_eq!(count_users(db.pool()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_login_failures_are_identical() {
    let (db, _temp_dir) = setup_test_db().await;
    let auth = service(&db);
    auth.register("user@test.local", "Pass1234!")
        .await
        .expect("Failed to register");

    let wrong_password = auth
        .login("user@test.local", "Wrong1234!")
        .await
        .expect_err("Wrong password should fail");
    let unknown_email = auth
        .login("ghost@test.local", "Pass1234!")
        .await
        .expect_err("Unknown email should fail");

    assert!(matches!(wrong_password, AuthError::InvalidCredentials));
    assert!(matches!(unknown_email, AuthError::InvalidCredentials));
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
}

#[tokio::test]
async fn test_session_valid_until_logout() {
    let (db, _temp_dir) = setup_test_db().await;
    let auth = service(&db);
    let registered = auth
        .register("user@test.local", "Pass1234!")
        .await
        .expect("Failed to register");

    let outcome = auth
        .login("user@test.local", "Pass1234!")
        .await
        .expect("Failed to login");
    assert_eq!(outcome.user, registered);

    let user = auth
        .validate_session(&outcome.session_token)
        .await
        .expect("Session should be valid");
    assert_eq!(user.id, registered.id);
    assert_eq!(user.email, "user@test.local");

    auth.logout(&outcome.session_token)
        .await
        .expect("Failed to logout");
    auth.logout(&outcome.session_token)
        .await
        .expect("Second logout should also succeed");

    let err = auth
        .validate_session(&outcome.session_token)
        .await
        .expect_err("Session should be gone");
    assert!(matches!(err, AuthError::InvalidSession));
}

#[tokio::test]
async fn test_concurrent_sessions_are_independent() {
    let (db, _temp_dir) = setup_test_db().await;
    let auth = service(&db);
    let user = auth
        .register("user@test.local", "Pass1234!")
        .await
        .expect("Failed to register");

    let first = auth.login("user@test.local", "Pass1234!").await.unwrap();
    let second = auth.login("user@test.local", "Pass1234!").await.unwrap();
    assert_ne!(first.session_token, second.session_token);
    assert_eq!(count_user_sessions(db.pool(), user.id).await.unwrap(), 2);

    auth.logout(&first.session_token).await.unwrap();

    assert!(auth.validate_session(&first.session_token).await.is_err());
    assert_eq!(
        auth.validate_session(&second.session_token).await.unwrap().id,
        user.id
    );
}

#[tokio::test]
async fn test_session_expires_after_duration() {
    let (db, _temp_dir) = setup_test_db().await;
    let auth = AuthService::with_session_duration(Arc::new(db.clone()), Duration::seconds(-1));
    auth.register("user@test.local", "Pass1234!")
        .await
        .expect("Failed to register");

    let outcome = auth
        .login("user@test.local", "Pass1234!")
        .await
        .expect("Failed to login");

    let err = auth
        .validate_session(&outcome.session_token)
        .await
        .expect_err("Expired session should not validate");
    assert!(matches!(err, AuthError::InvalidSession));
}

#[tokio::test]
async fn test_unknown_token_is_invalid_session() {
    let (db, _temp_dir) = setup_test_db().await;
    let auth = service(&db);

    let err = auth
        .validate_session("0000000000000000000000000000000000000000000000000000000000000000")
        .await
        .expect_err("Unknown token should not validate");
    assert!(matches!(err, AuthError::InvalidSession));
}
