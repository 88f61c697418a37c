//! CLI command implementations.

pub mod credentials;
pub mod generate;
pub mod keys;
pub mod serve;

use ally_core::AllyConfig;
use ally_store::SqliteStore;
use std::path::Path;

/// Load the configuration and open the database it names.
pub(crate) async fn open(config_path: Option<&Path>) -> anyhow::Result<(AllyConfig, SqliteStore)> {
    let config = AllyConfig::load(config_path)?;
    let store = SqliteStore::open(&config.database).await?;
    Ok((config, store))
}
