//! # ally-store
//!
//! SQLite persistence for the tool manager, built on a `sqlx` pool with
//! embedded migrations. Foreign keys are enforced, so deleting a tool, group
//! or user cascades to memberships, selections and credentials.
//!
//! [`SqliteStore`] also implements [`ally_oauth::CredentialStore`].

mod credentials;
pub mod error;
mod tools;
mod users;

pub use error::StoreError;

use ally_core::DatabaseConfig;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Handle to the database. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the configured database and run migrations.
    pub async fn open(config: &DatabaseConfig) -> Result<Self, StoreError> {
        ensure_parent_dir(&config.path)?;
        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        tracing::info!(path = %config.path.display(), "Opened SQLite database");
        Self::from_pool(pool).await
    }

    /// Private in-memory database, used by tests.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        // A single connection that never expires keeps the in-memory database alive.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn ensure_parent_dir(file_path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
