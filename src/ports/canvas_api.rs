//! Customer's Canvas API port: editor sessions and rendering of saved designs.

use serde::{Deserialize, Serialize};

use crate::error::SaveError;

/// What the editor page needs to load the Design Editor for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorSession {
    /// Design Editor base address (no trailing slash).
    pub editor_url: String,
    /// Design Editor auth token for the user, when credentials are configured.
    #[serde(default)]
    pub token_id: Option<String>,
}

/// A request to render a saved design (state file) into an output file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderRequest {
    /// Private design ID returned by `editor.saveProduct()`.
    pub state_id: String,
    /// Owner of the project created for the render.
    pub user_id: String,
    /// Output format (e.g. `"Pdf"`).
    pub format: String,
    /// Output color space (e.g. `"Cmyk"`).
    pub color_space: String,
    /// Output resolution.
    pub dpi: u32,
}

/// The first output file produced by the rendering pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedDesign {
    /// Output file name reported by the pipeline.
    pub name: String,
    /// Raw file bytes.
    #[serde(with = "super::base64_bytes")]
    pub data: Vec<u8>,
}

/// Calls the hosted Customer's Canvas services.
pub trait CanvasApi {
    /// Resolve the Design Editor address and a user token for the editor page.
    ///
    /// # Errors
    ///
    /// Returns an error if credentials are missing or an API call fails.
    fn editor_session(&self, user_id: &str) -> Result<EditorSession, SaveError>;

    /// Render a saved design and download its first output file.
    ///
    /// # Errors
    ///
    /// Returns [`SaveError::Render`] if the pipeline fails or never completes.
    fn render_design(&self, request: &RenderRequest) -> Result<RenderedDesign, SaveError>;
}
