use chrono::Duration;
use rand::{rngs::OsRng, RngCore};

use super::AuthError;

/// Number of random bytes in a session or CSRF token.
pub const TOKEN_BYTES: usize = 32;

/// How long a session stays valid after login. Never extended.
pub const SESSION_DURATION: Duration = Duration::days(7);

/// Generate a cryptographically secure random token: 32 bytes, hex-encoded.
///
/// Fails rather than returning a weak token if the OS random source errors.
pub fn generate_session_token() -> Result<String, AuthError> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AuthError::RandomnessUnavailable(e.to_string()))?;
    Ok(hex::encode(bytes))
}
