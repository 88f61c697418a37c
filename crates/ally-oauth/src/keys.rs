//! Signing key management.

use crate::error::AuthError;
use ally_core::OAuthConfig;
use biscuit_auth::{Algorithm, KeyPair, PrivateKey, PublicKey};
use rand::RngCore;

/// Ed25519 key pair that signs and verifies access tokens.
pub struct SigningKey {
    inner: KeyPair,
}

impl SigningKey {
    /// Generate a new random key.
    pub fn generate() -> Result<Self, AuthError> {
        let mut bytes = [0u8; 32];
        rand::rng().fill_bytes(&mut bytes);

        let private_key = PrivateKey::from_bytes(&bytes, Algorithm::Ed25519)
            .map_err(|e| AuthError::KeyGenerationFailed(e.to_string()))?;
        Ok(Self {
            inner: KeyPair::from(&private_key),
        })
    }

    /// Load a key from a hex-encoded private key.
    pub fn from_private_key_hex(hex: &str) -> Result<Self, AuthError> {
        let private_key = PrivateKey::from_bytes_hex(hex.trim(), Algorithm::Ed25519)
            .map_err(|e| AuthError::InvalidSigningKey(e.to_string()))?;
        Ok(Self {
            inner: KeyPair::from(&private_key),
        })
    }

    /// Resolve the configured key, or generate an ephemeral one.
    ///
    /// Tokens signed with an ephemeral key stop verifying after a restart.
    pub fn from_config(config: &OAuthConfig) -> Result<Self, AuthError> {
        let configured = config
            .resolve_signing_key()
            .map_err(|e| AuthError::InvalidSigningKey(e.to_string()))?;

        match configured {
            Some(hex) => Self::from_private_key_hex(&hex),
            None => {
                tracing::warn!(
                    env = %config.signing_key_env,
                    "No OAuth signing key configured, generating an ephemeral key"
                );
                Self::generate()
            }
        }
    }

    pub fn key_pair(&self) -> &KeyPair {
        &self.inner
    }

    pub fn public_key(&self) -> PublicKey {
        self.inner.public()
    }

    pub fn private_key_hex(&self) -> String {
        self.inner.private().to_bytes_hex()
    }

    pub fn public_key_hex(&self) -> String {
        self.inner.public().to_bytes_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_generate_and_reload() {
        let key = SigningKey::generate().unwrap();
        let reloaded = SigningKey::from_private_key_hex(&key.private_key_hex()).unwrap();
        assert_eq!(key.public_key_hex(), reloaded.public_key_hex());
    }

    #[test]
    fn test_invalid_hex_rejected() {
        assert!(matches!(
            SigningKey::from_private_key_hex("not hex"),
            Err(AuthError::InvalidSigningKey(_))
        ));
    }

    #[test]
    fn test_from_config_file() {
        let key = SigningKey::generate().unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", key.private_key_hex()).unwrap();

        let config = OAuthConfig {
            signing_key_env: "ALLY_TEST_KEYS_UNSET_VAR".into(),
            signing_key_file: Some(file.path().to_path_buf()),
            ..OAuthConfig::default()
        };
        let loaded = SigningKey::from_config(&config).unwrap();
        assert_eq!(loaded.public_key_hex(), key.public_key_hex());
    }

    #[test]
    fn test_from_config_without_key_is_ephemeral() {
        let config = OAuthConfig {
            signing_key_env: "ALLY_TEST_KEYS_UNSET_VAR".into(),
            ..OAuthConfig::default()
        };
        let a = SigningKey::from_config(&config).unwrap();
        let b = SigningKey::from_config(&config).unwrap();
        assert_ne!(a.public_key_hex(), b.public_key_hex());
    }
}
