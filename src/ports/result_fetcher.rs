//! Result fetcher port for save results delivered by reference.

use serde::{Deserialize, Serialize};

use crate::error::SaveError;

/// Bytes downloaded from a referenced save result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedResource {
    /// Raw response body.
    #[serde(with = "super::base64_bytes")]
    pub data: Vec<u8>,
    /// `Content-Type` reported by the server, if any.
    #[serde(default)]
    pub content_type: Option<String>,
}

/// Downloads a save result from a URL.
pub trait ResultFetcher {
    /// Fetch the resource at `url` synchronously.
    ///
    /// # Errors
    ///
    /// Returns [`SaveError::Fetch`] on a non-success status, or a network error.
    fn fetch(&self, url: &str) -> Result<FetchedResource, SaveError>;
}
