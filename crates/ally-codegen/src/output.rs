//! Writing the generated document.

use crate::error::CodegenError;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Replace the document at `path` with `text`.
///
/// The text is written to a temporary file next to the target and renamed
/// over it, so readers see either the old or the new document. Concurrent
/// writers are not serialized: the last rename wins.
pub fn write_document(path: &Path, text: &str) -> Result<(), CodegenError> {
    let write_err = |source: std::io::Error| CodegenError::GenerationWrite {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(write_err)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(text.as_bytes()).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    tracing::info!(path = %path.display(), bytes = text.len(), "Wrote generated document");
    Ok(())
}
