//! Credential hashing
//!
//! Passwords are hashed with Argon2id and a random salt. Inputs are cut to
//! [`MAX_PASSWORD_BYTES`] before hashing and before verifying, so both sides
//! always see the same bytes.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use std::sync::OnceLock;

use crate::constants::MAX_PASSWORD_BYTES;
use crate::error::{Result, RoleGateError};

/// The bytes of `secret` that actually take part in hashing
pub fn truncate_secret(secret: &str) -> &[u8] {
    let bytes = secret.as_bytes();
    &bytes[..bytes.len().min(MAX_PASSWORD_BYTES)]
}

/// Hash a password into a PHC string
pub fn hash_password(secret: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(truncate_secret(secret), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| RoleGateError::SystemError(format!("Password hashing failed: {}", e)))
}

/// Check a password against a stored digest
///
/// A digest that cannot be parsed simply does not match.
pub fn verify_password(secret: &str, digest: &str) -> bool {
    let parsed = match PasswordHash::new(digest) {
        Ok(parsed) => parsed,
        Err(e) => {
            log::debug!("Stored password digest could not be parsed: {}", e);
            return false;
        }
    };

    Argon2::default()
        .verify_password(truncate_secret(secret), &parsed)
        .is_ok()
}

/// [`hash_password`] on the blocking pool
pub async fn hash_password_blocking(secret: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&secret)).await?
}

// Verified against when there is no stored digest, so a miss costs a full verify
fn dummy_digest() -> Option<&'static str> {
    static DUMMY: OnceLock<Option<String>> = OnceLock::new();
    DUMMY
        .get_or_init(|| hash_password("rolegate-timing-equalizer").ok())
        .as_deref()
}

/// [`verify_password`] on the blocking pool
///
/// With no stored digest the secret is checked against a throwaway digest
/// and the result is always `false`.
pub async fn verify_password_blocking(secret: String, digest: Option<String>) -> Result<bool> {
    let verified = tokio::task::spawn_blocking(move || match digest {
        Some(digest) => verify_password(&secret, &digest),
        None => {
            if let Some(dummy) = dummy_digest() {
                let _ = verify_password(&secret, dummy);
            }
            false
        }
    })
    .await?;

    Ok(verified)
}
