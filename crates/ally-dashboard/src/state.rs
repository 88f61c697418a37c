//! Shared application state.

use ally_codegen::{Generator, GeneratorOptions};
use ally_core::AllyConfig;
use ally_mcp::McpDiscovery;
use ally_oauth::OAuthIssuer;
use ally_store::SqliteStore;
use std::path::Path;
use std::sync::Arc;

/// State shared by the dashboard and the API handlers. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AllyConfig,
    store: SqliteStore,
    issuer: Arc<OAuthIssuer>,
    generator: Generator,
    discovery: McpDiscovery,
}

impl AppState {
    pub fn new(config: AllyConfig, store: SqliteStore, issuer: Arc<OAuthIssuer>) -> Self {
        let generator = Generator::new(GeneratorOptions::from(&config.mcp));
        let discovery = McpDiscovery::from_config(&config.mcp);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                issuer,
                generator,
                discovery,
            }),
        }
    }

    pub fn config(&self) -> &AllyConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &SqliteStore {
        &self.inner.store
    }

    pub fn issuer(&self) -> &OAuthIssuer {
        &self.inner.issuer
    }

    pub fn generator(&self) -> &Generator {
        &self.inner.generator
    }

    pub fn discovery(&self) -> &McpDiscovery {
        &self.inner.discovery
    }

    /// Where "update external tools" writes the document.
    pub fn output_path(&self) -> &Path {
        &self.inner.config.generator.output_path
    }
}
