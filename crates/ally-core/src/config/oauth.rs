//! OAuth issuer configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the client-credentials issuer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    /// Hex-encoded Ed25519 signing key. Prefer the environment variable.
    #[serde(default)]
    pub signing_key_hex: Option<String>,

    /// Environment variable holding the hex-encoded signing key.
    #[serde(default = "default_signing_key_env")]
    pub signing_key_env: String,

    /// File holding the hex-encoded signing key.
    #[serde(default)]
    pub signing_key_file: Option<PathBuf>,

    /// Scope granted when a token request does not name one.
    #[serde(default = "default_scope")]
    pub default_scope: String,

    /// Redirect URIs recorded on newly created clients.
    #[serde(default = "default_redirect_uris")]
    pub redirect_uris: Vec<String>,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            signing_key_hex: None,
            signing_key_env: default_signing_key_env(),
            signing_key_file: None,
            default_scope: default_scope(),
            redirect_uris: default_redirect_uris(),
        }
    }
}

impl OAuthConfig {
    /// Resolve the signing key from environment, then file, then inline value.
    pub fn resolve_signing_key(&self) -> Result<Option<String>, std::io::Error> {
        if let Ok(key) = std::env::var(&self.signing_key_env) {
            if !key.trim().is_empty() {
                return Ok(Some(key.trim().to_string()));
            }
        }

        if let Some(path) = &self.signing_key_file {
            if path.exists() {
                let key = std::fs::read_to_string(path)?;
                return Ok(Some(key.trim().to_string()));
            }
        }

        Ok(self.signing_key_hex.clone())
    }
}

fn default_signing_key_env() -> String {
    "ALLY_OAUTH_SIGNING_KEY".to_string()
}

fn default_scope() -> String {
    "read:tools".to_string()
}

fn default_redirect_uris() -> Vec<String> {
    vec![
        "http://localhost:8501/oauth/callback".to_string(),
        "urn:ietf:wg:oauth:2.0:oob".to_string(),
    ]
}
