//! Recording adapter for the `ResultFetcher` port.

use std::sync::{Arc, Mutex};

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::error::SaveError;
use crate::ports::result_fetcher::{FetchedResource, ResultFetcher};

/// Records fetches while delegating to an inner implementation.
pub struct RecordingResultFetcher {
    inner: Box<dyn ResultFetcher>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingResultFetcher {
    /// Creates a new recording fetcher wrapping the given implementation.
    pub fn new(inner: Box<dyn ResultFetcher>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl ResultFetcher for RecordingResultFetcher {
    fn fetch(&self, url: &str) -> Result<FetchedResource, SaveError> {
        let result = self.inner.fetch(url);
        record_result(
            &self.recorder,
            "result_fetcher",
            "fetch",
            &serde_json::json!({ "url": url }),
            &result,
        );
        result
    }
}
