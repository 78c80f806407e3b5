//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the save flow and an external
//! system. Implementations live in `src/adapters/`.

pub mod browser;
pub mod canvas_api;
pub mod result_fetcher;

pub use browser::BrowserLauncher;
pub use canvas_api::{CanvasApi, EditorSession, RenderRequest, RenderedDesign};
pub use result_fetcher::{FetchedResource, ResultFetcher};

/// Serde helper for serializing `Vec<u8>` as base64 strings in cassettes.
pub(crate) mod base64_bytes {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize bytes as base64 string.
    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(data);
        serializer.serialize_str(&encoded)
    }

    /// Deserialize base64 string to bytes.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}
