//! Recording adapter for the `CanvasApi` port.

use std::sync::{Arc, Mutex};

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::error::SaveError;
use crate::ports::canvas_api::{CanvasApi, EditorSession, RenderRequest, RenderedDesign};

/// Records Customer's Canvas calls while delegating to an inner implementation.
pub struct RecordingCanvasApi {
    inner: Box<dyn CanvasApi>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingCanvasApi {
    /// Creates a new recording client wrapping the given implementation.
    pub fn new(inner: Box<dyn CanvasApi>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl CanvasApi for RecordingCanvasApi {
    fn editor_session(&self, user_id: &str) -> Result<EditorSession, SaveError> {
        let result = self.inner.editor_session(user_id);
        record_result(
            &self.recorder,
            "canvas_api",
            "editor_session",
            &serde_json::json!({ "user_id": user_id }),
            &result,
        );
        result
    }

    fn render_design(&self, request: &RenderRequest) -> Result<RenderedDesign, SaveError> {
        let result = self.inner.render_design(request);
        record_result(&self.recorder, "canvas_api", "render_design", request, &result);
        result
    }
}
