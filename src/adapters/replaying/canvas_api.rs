//! Replaying adapter for the `CanvasApi` port.

use std::sync::{Arc, Mutex};

use super::{next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::error::SaveError;
use crate::ports::canvas_api::{CanvasApi, EditorSession, RenderRequest, RenderedDesign};

/// Serves recorded Customer's Canvas results from a cassette.
pub struct ReplayingCanvasApi {
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingCanvasApi {
    /// Create a replaying client backed by the given replayer.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer }
    }
}

impl CanvasApi for ReplayingCanvasApi {
    fn editor_session(&self, _user_id: &str) -> Result<EditorSession, SaveError> {
        next_output(&self.replayer, "canvas_api", "editor_session")
            .and_then(replay_result::<EditorSession>)
            .map_err(|message| SaveError::Api { status: 0, message })
    }

    fn render_design(&self, _request: &RenderRequest) -> Result<RenderedDesign, SaveError> {
        next_output(&self.replayer, "canvas_api", "render_design")
            .and_then(replay_result::<RenderedDesign>)
            .map_err(SaveError::Render)
    }
}
