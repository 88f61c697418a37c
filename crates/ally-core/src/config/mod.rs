//! Configuration types for the Ally Agent tool manager.
//!
//! Configuration is a single TOML file. The path comes from `$ALLY_CONFIG`,
//! falling back to `ally.toml` in the working directory. Every section is
//! optional and a missing file yields the defaults.
//!
//! ```toml
//! [server]
//! bind = "0.0.0.0:8080"
//!
//! [database]
//! path = "data/ally.sqlite"
//!
//! [oauth]
//! signing_key_env = "ALLY_OAUTH_SIGNING_KEY"
//! default_scope = "read:tools"
//!
//! [mcp]
//! endpoint_url = "http://localhost:8000/mcp"
//! discovery_timeout_secs = 10
//!
//! [generator]
//! output_path = "external_tool_agents.py"
//! ```

pub mod database;
pub mod generator;
pub mod mcp;
pub mod oauth;
pub mod server;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub use database::DatabaseConfig;
pub use generator::GeneratorConfig;
pub use mcp::McpConfig;
pub use oauth::OAuthConfig;
pub use server::ServerConfig;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "ALLY_CONFIG";

/// Configuration file used when `$ALLY_CONFIG` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "ally.toml";

/// Complete configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AllyConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub oauth: OAuthConfig,

    #[serde(default)]
    pub mcp: McpConfig,

    #[serde(default)]
    pub generator: GeneratorConfig,
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AllyConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML content.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }

    /// Resolve the configuration path from `$ALLY_CONFIG` or the default file name.
    pub fn default_path() -> PathBuf {
        std::env::var(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Load from `path` when given, otherwise from [`AllyConfig::default_path`].
    ///
    /// A missing file is not an error: defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_path);

        if !path.exists() {
            tracing::info!(path = %path.display(), "No config file found, using defaults");
            return Ok(Self::default());
        }

        tracing::info!(path = %path.display(), "Loading configuration");
        let config = Self::from_file(&path)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot work at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.socket_addr()?;
        if self.mcp.discovery_timeout_secs == 0 {
            return Err(ConfigError::Config(
                "mcp.discovery_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.oauth.default_scope.trim().is_empty() {
            return Err(ConfigError::Config("oauth.default_scope must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_document_yields_defaults() {
        let config = AllyConfig::from_toml("").unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.database.path, PathBuf::from("data/ally.sqlite"));
        assert_eq!(config.oauth.default_scope, "read:tools");
        assert_eq!(config.oauth.signing_key_env, "ALLY_OAUTH_SIGNING_KEY");
        assert_eq!(config.mcp.endpoint_url, "http://localhost:8000/mcp");
        assert_eq!(config.mcp.discovery_timeout_secs, 10);
        assert_eq!(
            config.generator.output_path,
            PathBuf::from("external_tool_agents.py")
        );
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = AllyConfig::from_toml(
            r#"
            [mcp]
            endpoint_url = "http://mcp.internal:9000/mcp"

            [generator]
            output_path = "out/agents.py"
            "#,
        )
        .unwrap();

        assert_eq!(config.mcp.endpoint_url, "http://mcp.internal:9000/mcp");
        assert_eq!(config.mcp.discovery_timeout_secs, 10);
        assert_eq!(config.generator.output_path, PathBuf::from("out/agents.py"));
        assert_eq!(config.oauth.redirect_uris.len(), 2);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AllyConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:8080");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nbind = \"127.0.0.1:9999\"").unwrap();

        let config = AllyConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.server.socket_addr().unwrap().port(), 9999);
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let err = AllyConfig::from_toml("[server\nbind = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = AllyConfig::from_toml("[mcp]\ndiscovery_timeout_secs = 0").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_bad_bind() {
        let config = AllyConfig::from_toml("[server]\nbind = \"not-an-address\"").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_signing_key_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "  abcdef  ").unwrap();

        let config = OAuthConfig {
            signing_key_env: "ALLY_TEST_UNSET_SIGNING_KEY_VAR".to_string(),
            signing_key_file: Some(file.path().to_path_buf()),
            ..OAuthConfig::default()
        };
        assert_eq!(config.resolve_signing_key().unwrap().as_deref(), Some("abcdef"));
    }

    #[test]
    fn test_signing_key_falls_back_to_inline_value() {
        let config = OAuthConfig {
            signing_key_env: "ALLY_TEST_UNSET_SIGNING_KEY_VAR".to_string(),
            signing_key_hex: Some("00ff".to_string()),
            ..OAuthConfig::default()
        };
        assert_eq!(config.resolve_signing_key().unwrap().as_deref(), Some("00ff"));
    }
}
