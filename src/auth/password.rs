use argon2::{
    password_hash::{
        rand_core::{OsRng, RngCore},
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

use super::AuthError;

/// Argon2id memory cost in KiB.
pub const MEMORY_COST_KIB: u32 = 19_456;
/// Argon2id iteration count.
pub const TIME_COST: u32 = 2;
/// Argon2id lanes.
pub const PARALLELISM: u32 = 1;

const SALT_LEN: usize = 16;

/// Hash a password using Argon2id with a fresh random salt.
///
/// The result is a PHC string carrying algorithm, version, cost parameters,
/// salt and hash, so it can be verified after the constants above change.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let mut salt_bytes = [0u8; SALT_LEN];
    OsRng
        .try_fill_bytes(&mut salt_bytes)
        .map_err(|e| AuthError::RandomnessUnavailable(e.to_string()))?;
    let salt =
        SaltString::encode_b64(&salt_bytes).map_err(|e| AuthError::Hashing(e.to_string()))?;

    let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, None)
        .map_err(|e| AuthError::Hashing(e.to_string()))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hashing(e.to_string()))?
        .to_string();

    Ok(password_hash)
}

/// Verify a password against its digest.
///
/// Parameters come from the digest itself. A malformed digest verifies as `false`.
#[must_use]
pub fn verify_password(password_hash: &str, password: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(password_hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Validate password meets minimum length requirement.
/// Returns Ok(()) if valid, Err with message if invalid.
pub fn validate_password_strength(password: &str) -> Result<(), String> {
    const MIN_LENGTH: usize = 8;

    if password.chars().count() < MIN_LENGTH {
        return Err(format!("Password must be at least {MIN_LENGTH} characters long"));
    }

    Ok(())
}
