//! Replaying adapter for the `ResultFetcher` port.

use std::sync::{Arc, Mutex};

use super::{next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::error::SaveError;
use crate::ports::result_fetcher::{FetchedResource, ResultFetcher};

/// Serves recorded fetch results from a cassette.
pub struct ReplayingResultFetcher {
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingResultFetcher {
    /// Create a replaying fetcher backed by the given replayer.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer }
    }
}

impl ResultFetcher for ReplayingResultFetcher {
    fn fetch(&self, url: &str) -> Result<FetchedResource, SaveError> {
        next_output(&self.replayer, "result_fetcher", "fetch")
            .and_then(replay_result::<FetchedResource>)
            .map_err(|message| SaveError::Fetch { url: url.to_string(), message })
    }
}
