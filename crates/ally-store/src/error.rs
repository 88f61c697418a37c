//! Error types for the store.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A required field was missing or blank.
    #[error("{field} is required")]
    Validation { field: &'static str },

    /// A referenced row does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// A unique name is already taken.
    #[error("{entity} '{name}' already exists")]
    Conflict { entity: &'static str, name: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub(crate) fn required(value: &str, field: &'static str) -> Result<String, StoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(StoreError::Validation { field })
    } else {
        Ok(trimmed.to_string())
    }
}
