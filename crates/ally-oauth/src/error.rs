//! Error types for the OAuth issuer.

use thiserror::Error;

/// Errors raised while issuing or checking credentials.
///
/// Messages never contain secrets or token material.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The client id is unknown or the client has been revoked.
    #[error("invalid client")]
    InvalidClient,

    /// The client secret does not match the stored hash.
    #[error("invalid client secret")]
    InvalidSecret,

    /// The bearer token is malformed, forged, expired or revoked.
    #[error("invalid or expired token")]
    InvalidToken,

    /// The token lacks the scope required by the endpoint.
    #[error("insufficient scope: {required} required")]
    InsufficientScope { required: String },

    #[error("unsupported grant type: {0}")]
    UnsupportedGrantType(String),

    /// No user exists for this id.
    #[error("user {user_id} not found")]
    UnknownUser { user_id: i64 },

    #[error("failed to parse signing key: {0}")]
    InvalidSigningKey(String),

    #[error("failed to generate signing key: {0}")]
    KeyGenerationFailed(String),

    #[error("failed to create token: {0}")]
    TokenCreationFailed(String),

    #[error("failed to hash client secret: {0}")]
    HashingFailed(String),

    #[error("failed to verify client secret: {0}")]
    VerificationFailed(String),

    #[error("credential store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl AuthError {
    /// Whether this error is a rejected credential rather than a server fault.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidClient
                | AuthError::InvalidSecret
                | AuthError::InvalidToken
                | AuthError::InsufficientScope { .. }
                | AuthError::UnsupportedGrantType(_)
        )
    }
}
