//! Save results and writing them to disk.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::SaveError;

/// Design bytes obtained from a callback, with the reference they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveResult {
    /// Design ID, state ID or download URL.
    pub reference: String,
    /// Raw file bytes, in the format chosen by the remote service.
    pub data: Vec<u8>,
}

/// Outcome of a successful session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Saved {
    /// Where the reference came from.
    pub reference: String,
    /// File that was written.
    pub path: PathBuf,
    /// Number of bytes written.
    pub size: usize,
}

/// Resolve the output path for `file_name` inside `dir`.
#[must_use]
pub fn output_path(dir: &Path, file_name: &str) -> PathBuf {
    dir.join(file_name)
}

/// Write the save result to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns [`SaveError::Io`] if the file cannot be written.
pub fn persist(result: SaveResult, path: &Path) -> Result<Saved, SaveError> {
    std::fs::write(path, &result.data)?;
    info!(path = %path.display(), bytes = result.data.len(), reference = %result.reference, "design saved");
    Ok(Saved { reference: result.reference, path: path.to_path_buf(), size: result.data.len() })
}
