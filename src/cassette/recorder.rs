//! Captures the port calls of one save session into a cassette file.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::debug;

use super::format::{Cassette, Interaction};
use crate::error::SaveError;

/// File name of a session cassette inside its timestamped directory.
pub const SESSION_CASSETTE: &str = "session.cassette.yaml";

/// Where the cassette for a session started at `timestamp` is written.
#[must_use]
pub fn session_cassette_path(root: &Path, timestamp: &str) -> PathBuf {
    root.join(timestamp).join(SESSION_CASSETTE)
}

/// Accumulates interactions in memory until the session ends.
#[derive(Debug)]
pub struct CassetteRecorder {
    path: PathBuf,
    cassette: Cassette,
}

impl CassetteRecorder {
    /// Start an empty cassette that [`finish`](Self::finish) writes to `path`.
    pub fn new(
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        commit: impl Into<String>,
    ) -> Self {
        let cassette = Cassette {
            name: name.into(),
            recorded_at: Utc::now(),
            commit: commit.into(),
            interactions: Vec::new(),
        };
        Self { path: path.into(), cassette }
    }

    /// Append one call; its `seq` is its position across all ports.
    pub fn record(
        &mut self,
        port: &str,
        method: &str,
        input: serde_json::Value,
        output: serde_json::Value,
    ) {
        let interactions = &mut self.cassette.interactions;
        interactions.push(Interaction {
            seq: interactions.len() as u64,
            port: port.to_string(),
            method: method.to_string(),
            input,
            output,
        });
    }

    /// Stamp the cassette and write it as YAML, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`SaveError::Io`] if the cassette cannot be serialized or written.
    pub fn finish(mut self) -> Result<PathBuf, SaveError> {
        self.cassette.recorded_at = Utc::now();
        let yaml = serde_yaml::to_string(&self.cassette).map_err(std::io::Error::other)?;
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&self.path, yaml)?;
        debug!(
            path = %self.path.display(),
            interactions = self.cassette.interactions.len(),
            "cassette written"
        );
        Ok(self.path)
    }
}
