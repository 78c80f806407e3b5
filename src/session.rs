//! Session initiator: describes the editor session and opens it in a browser.

use std::fmt;

use tracing::info;
use url::Url;

use crate::config::EditorConfig;
use crate::error::SaveError;
use crate::ports::BrowserLauncher;

/// Which program is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeKind {
    /// Blank canvas of a configured size.
    Blank,
    /// Design template from the tenant's asset storage.
    Template,
}

/// How the editor is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    /// Empty artboard, size in points.
    Blank {
        /// Width in points.
        width: u32,
        /// Height in points.
        height: u32,
    },
    /// Existing design template.
    Template {
        /// Design ID as shown in the asset manager.
        design_id: String,
    },
}

impl EditorMode {
    /// Build the mode for `kind` from the editor settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the size is zero or no template ID is configured.
    pub fn from_config(kind: ModeKind, editor: &EditorConfig) -> Result<Self, SaveError> {
        match kind {
            ModeKind::Blank => {
                if editor.width == 0 || editor.height == 0 {
                    return Err(SaveError::Config(format!(
                        "blank canvas size must be positive, got {}x{}",
                        editor.width, editor.height
                    )));
                }
                Ok(Self::Blank { width: editor.width, height: editor.height })
            }
            ModeKind::Template => match editor.template_id.as_deref().map(str::trim) {
                Some(id) if !id.is_empty() => Ok(Self::Template { design_id: id.to_string() }),
                _ => Err(SaveError::Config(
                    "editor.template_id is required to open a template".to_string(),
                )),
            },
        }
    }

    /// Output file written in the working directory for this mode.
    #[must_use]
    pub fn output_file_name(&self) -> &'static str {
        match self {
            Self::Blank { .. } => "blank-canvas.pdf",
            Self::Template { .. } => "template-design.pdf",
        }
    }
}

impl fmt::Display for EditorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blank { width, height } => write!(f, "blank {width}x{height}"),
            Self::Template { design_id } => write!(f, "template {design_id}"),
        }
    }
}

/// Build the URL that opens the editor for `mode` and reports back to `callback_url`.
///
/// # Errors
///
/// Returns an error if `base` is not an absolute URL.
pub fn build_launch_url(base: &str, mode: &EditorMode, callback_url: &str) -> Result<Url, SaveError> {
    let mut url = Url::parse(base)
        .map_err(|e| SaveError::Config(format!("invalid launch URL '{base}': {e}")))?;
    {
        let mut query = url.query_pairs_mut();
        match mode {
            EditorMode::Blank { width, height } => {
                query
                    .append_pair("mode", "blank")
                    .append_pair("width", &width.to_string())
                    .append_pair("height", &height.to_string());
            }
            EditorMode::Template { design_id } => {
                query.append_pair("mode", "template").append_pair("templateId", design_id);
            }
        }
        query.append_pair("callbackUrl", callback_url);
    }
    Ok(url)
}

/// Open the launch URL. There is no retry.
///
/// # Errors
///
/// Returns [`SaveError::Launch`] if the browser could not be started.
pub fn launch(launcher: &dyn BrowserLauncher, url: &Url) -> Result<(), SaveError> {
    info!(%url, "opening editor");
    launcher.launch(url.as_str())
}
