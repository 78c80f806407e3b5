//! Unified error type for canvas-save.

use thiserror::Error;

/// Errors that can end a save session.
///
/// Every variant is fatal for the single-shot run.
#[derive(Debug, Error)]
pub enum SaveError {
    /// The browser could not be launched.
    #[error("Could not launch browser: {0}")]
    Launch(String),

    /// The callback request did not carry a usable save result.
    #[error("Could not parse callback: {0}")]
    MalformedCallback(String),

    /// A referenced save result could not be downloaded.
    #[error("Could not fetch result from {url}: {message}")]
    Fetch {
        /// The URL that was requested.
        url: String,
        /// What went wrong.
        message: String,
    },

    /// The remote rendering pipeline failed or did not finish.
    #[error("Rendering failed: {0}")]
    Render(String),

    /// An API returned an error response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// A network error occurred.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// An I/O error occurred.
    #[error("Could not write file: {0}")]
    Io(#[from] std::io::Error),

    /// The local listener could not be started.
    #[error("Could not start callback server: {0}")]
    Server(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// No credentials configured for the Customer's Canvas API.
    #[error("No {what} configured. Set {env_var} or add it to the config file.")]
    MissingCredentials {
        /// The missing setting.
        what: String,
        /// The environment variable name.
        env_var: String,
    },
}

impl SaveError {
    /// HTTP status reported back to the caller of the callback URL.
    #[must_use]
    pub fn callback_status(&self) -> u16 {
        match self {
            Self::MalformedCallback(_) => 400,
            Self::Fetch { .. } | Self::Render(_) | Self::Api { .. } | Self::Network(_) => 502,
            _ => 500,
        }
    }
}
