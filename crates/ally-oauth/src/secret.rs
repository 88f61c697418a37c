//! Client ids and secrets.
//!
//! Secrets are 32 random bytes, base64url encoded without padding. Only the
//! Argon2 PHC string is ever stored.

use crate::error::AuthError;
use argon2::{
    Argon2, PasswordHash, PasswordVerifier,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use std::sync::LazyLock;

const CLIENT_ID_PREFIX: &str = "ally_agent_user_";

/// Hash of a throwaway secret nobody holds.
static DECOY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_secret(&generate_secret()).ok());

/// Deterministic client id for a user.
pub fn client_id_for(user_id: i64) -> String {
    format!("{CLIENT_ID_PREFIX}{user_id}")
}

/// Fresh plaintext secret.
pub fn generate_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Salted Argon2 hash of a secret, in PHC format.
pub fn hash_secret(secret: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::HashingFailed(e.to_string()))
}

/// Check a presented secret against a stored hash.
///
/// An unparsable stored hash counts as a mismatch.
pub fn verify_secret(secret: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "Stored client secret hash is not a valid PHC string");
            false
        }
    }
}

/// Spend one verification on a hash nobody can match, and report a mismatch.
///
/// Unknown and revoked clients go through this so they cost the same as a
/// wrong secret.
pub fn verify_decoy(secret: &str) -> bool {
    if let Some(hash) = DECOY_HASH.as_deref() {
        let _ = verify_secret(secret, hash);
    }
    false
}
