//! Static editor page served on `GET /`.
//!
//! The page loads the Design Editor through its IFrame API, and its save
//! button posts `{stateId, userId}` to the callback URL.

use askama::Template;
use serde_json::json;

use crate::error::SaveError;
use crate::ports::EditorSession;
use crate::session::EditorMode;

/// `templates/editor.html`. The JSON fields are embedded verbatim in an
/// inline script and must come from [`script_json`].
#[derive(Template)]
#[template(path = "editor.html")]
struct EditorPage {
    mode: String,
    script_src: String,
    product: String,
    config: String,
    callback_url: String,
    user_id: String,
}

/// Render the editor page for a session.
///
/// # Errors
///
/// Returns [`SaveError::Server`] if the template fails to render.
pub fn render_editor_page(
    mode: &EditorMode,
    session: &EditorSession,
    user_id: &str,
    callback_url: &str,
) -> Result<String, SaveError> {
    let product = match mode {
        EditorMode::Blank { width, height } => json!({ "surfaces": [{ "width": width, "height": height }] }),
        EditorMode::Template { design_id } => json!(design_id),
    };

    let mut config = json!({
        "userId": user_id,
        "initialMode": "Advanced",
        "canvas": { "shadowEnabled": true },
    });
    if let Some(ref token) = session.token_id {
        config["tokenId"] = json!(token);
    }

    EditorPage {
        mode: mode.to_string(),
        script_src: format!("{}/Resources/Generated/IframeApi.js", session.editor_url),
        product: script_json(&product),
        config: script_json(&config),
        callback_url: script_json(&json!(callback_url)),
        user_id: script_json(&json!(user_id)),
    }
    .render()
    .map_err(|e| SaveError::Server(format!("could not render editor page: {e}")))
}

/// JSON for embedding in an inline `<script>`.
fn script_json(value: &serde_json::Value) -> String {
    value.to_string().replace("</", "<\\/")
}
