//! Loading a session cassette for replay.

use std::path::Path;

use tracing::debug;

use super::format::Cassette;
use super::replayer::CassetteReplayer;
use crate::error::SaveError;

/// Read a session cassette and check that its calls are in recorded order.
///
/// # Errors
///
/// Returns [`SaveError::Config`] if the file is unreadable, is not a cassette,
/// or its `seq` numbers do not increase.
pub fn load_cassette(path: &Path) -> Result<CassetteReplayer, SaveError> {
    let failed = |reason: String| SaveError::Config(format!("Failed to load cassette {}: {reason}", path.display()));

    let content = std::fs::read_to_string(path).map_err(|e| failed(e.to_string()))?;
    let cassette: Cassette = serde_yaml::from_str(&content).map_err(|e| failed(e.to_string()))?;

    if let Some(pair) = cassette.interactions.windows(2).find(|w| w[1].seq <= w[0].seq) {
        return Err(failed(format!("seq {} follows seq {}", pair[1].seq, pair[0].seq)));
    }

    debug!(
        name = %cassette.name,
        commit = %cassette.commit,
        interactions = cassette.interactions.len(),
        "cassette loaded"
    );
    Ok(CassetteReplayer::new(&cassette))
}
