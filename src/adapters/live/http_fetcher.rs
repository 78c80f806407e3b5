//! Live adapter that downloads referenced save results over HTTP.

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;

use crate::error::SaveError;
use crate::ports::result_fetcher::{FetchedResource, ResultFetcher};

/// Fetches save results with a blocking `reqwest` client.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with a default client.
    #[must_use]
    pub fn new() -> Self {
        Self { client: Client::new() }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<FetchedResource, SaveError> {
        let response = self.client.get(url).send().map_err(|e| SaveError::Fetch {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SaveError::Fetch { url: url.to_string(), message: format!("HTTP {status}") });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let data = response
            .bytes()
            .map_err(|e| SaveError::Fetch { url: url.to_string(), message: e.to_string() })?
            .to_vec();

        Ok(FetchedResource { data, content_type })
    }
}
