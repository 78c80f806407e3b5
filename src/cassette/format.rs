//! On-disk cassette layout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded session: every call made through a recorded port, in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cassette {
    /// Human-readable cassette name.
    pub name: String,
    /// When the recording finished.
    pub recorded_at: DateTime<Utc>,
    /// Git commit the recording was made from.
    pub commit: String,
    /// Recorded calls.
    pub interactions: Vec<Interaction>,
}

/// One call through a port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    /// Position in the recording, across all ports.
    pub seq: u64,
    /// Port name (e.g. `"result_fetcher"`).
    pub port: String,
    /// Method name on the port.
    pub method: String,
    /// Serialized arguments.
    pub input: serde_json::Value,
    /// Serialized result, as `{"Ok": ...}` or `{"Err": "..."}`.
    pub output: serde_json::Value,
}
