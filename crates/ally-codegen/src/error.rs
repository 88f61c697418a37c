//! Error types for document generation.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodegenError {
    /// The generated document could not be written. The previous document, if any, is left as it was.
    #[error("failed to write generated document to {}", path.display())]
    GenerationWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
