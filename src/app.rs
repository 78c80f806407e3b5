//! The save flow: launch the editor, wait for the callback, write the file.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::cli::Cli;
use crate::config::{self, Config};
use crate::context::ServiceContext;
use crate::error::SaveError;
use crate::output::{self, SaveResult, Saved};
use crate::ports::RenderRequest;
use crate::receiver::page::render_editor_page;
use crate::receiver::{CallbackPayload, CallbackReceiver, DEFAULT_HOST, DEFAULT_PORT};
use crate::session::{self, EditorMode, ModeKind};

/// Everything one session needs besides its ports.
#[derive(Debug, Clone)]
pub struct SessionPlan {
    /// Blank canvas or template.
    pub mode: EditorMode,
    /// Owner of the design in your system.
    pub user_id: String,
    /// Page opened in the browser; the receiver's own page when `None`.
    pub launch_base: Option<String>,
    /// Output format requested when a saved design has to be rendered.
    pub format: String,
    /// Output color space for rendering.
    pub color_space: String,
    /// Output resolution for rendering.
    pub dpi: u32,
    /// File the design is written to.
    pub output: PathBuf,
}

impl SessionPlan {
    /// Build the plan for `mode`, writing into `dir`.
    #[must_use]
    pub fn new(mode: EditorMode, config: &Config, dir: &Path) -> Self {
        let output = output::output_path(dir, mode.output_file_name());
        Self {
            mode,
            user_id: config.editor.user_id.clone(),
            launch_base: config.editor.launch_url.clone(),
            format: config.render.format.clone(),
            color_space: config.render.color_space.clone(),
            dpi: config.render.dpi,
            output,
        }
    }
}

/// Run one session on an already bound receiver.
///
/// # Errors
///
/// Returns the first fatal error: launch, malformed callback, fetch/render
/// or file write.
pub fn run_session(
    plan: &SessionPlan,
    ctx: &ServiceContext,
    receiver: CallbackReceiver,
) -> Result<Saved, SaveError> {
    let callback_url = receiver.callback_url();

    let (receiver, base) = match plan.launch_base {
        Some(ref base) => (receiver, base.clone()),
        None => {
            let editor = ctx.canvas.editor_session(&plan.user_id)?;
            debug!(editor_url = %editor.editor_url, "editor session ready");
            let html = render_editor_page(&plan.mode, &editor, &plan.user_id, &callback_url)?;
            let base = receiver.page_url();
            (receiver.with_page(html), base)
        }
    };

    let launch_url = session::build_launch_url(&base, &plan.mode, &callback_url)?;
    session::launch(ctx.launcher.as_ref(), &launch_url)?;

    info!(mode = %plan.mode, %callback_url, "waiting for the editor to save");
    receiver.serve_once(
        |payload| resolve(plan, ctx, payload),
        |result| output::persist(result, &plan.output),
    )
}

/// Turn a callback payload into design bytes.
fn resolve(
    plan: &SessionPlan,
    ctx: &ServiceContext,
    payload: CallbackPayload,
) -> Result<SaveResult, SaveError> {
    match payload {
        CallbackPayload::Inline { reference, data } => Ok(SaveResult { reference, data }),
        CallbackPayload::Download { url } => {
            let fetched = ctx.fetcher.fetch(&url)?;
            debug!(%url, bytes = fetched.data.len(), content_type = ?fetched.content_type, "fetched");
            Ok(SaveResult { reference: url, data: fetched.data })
        }
        CallbackPayload::State { state_id, user_id } => {
            let request = RenderRequest {
                state_id: state_id.clone(),
                user_id: user_id.unwrap_or_else(|| plan.user_id.clone()),
                format: plan.format.clone(),
                color_space: plan.color_space.clone(),
                dpi: plan.dpi,
            };
            let rendered = ctx.canvas.render_design(&request)?;
            debug!(name = %rendered.name, bytes = rendered.data.len(), "rendered");
            Ok(SaveResult { reference: state_id, data: rendered.data })
        }
    }
}

/// Entry point shared by both programs.
///
/// # Errors
///
/// Returns any configuration, launch, callback, fetch or I/O error.
pub fn run(kind: ModeKind, cli: &Cli) -> Result<Saved, SaveError> {
    let config_path = config::discover_config_path(cli.config.as_deref());
    let config = Config::load(&config_path).map_err(SaveError::Config)?;
    debug!(path = %config_path.display(), "config loaded");

    let mode = EditorMode::from_config(kind, &config.editor)?;
    let plan = SessionPlan::new(mode, &config, &std::env::current_dir()?);

    let replay_path = std::env::var("CANVAS_SAVE_REPLAY").ok();
    let is_recording = std::env::var("CANVAS_SAVE_REC").is_ok_and(|v| v == "true" || v == "1");

    let (ctx, recording_session) = if let Some(ref cassette_path) = replay_path {
        info!(cassette = %cassette_path, "replaying");
        (ServiceContext::replaying(Path::new(cassette_path), &config, cli.no_browser)?, None)
    } else if is_recording {
        info!("recording mode enabled");
        let (ctx, session) = ServiceContext::recording(&config, cli.no_browser);
        (ctx, Some(session))
    } else {
        (ServiceContext::live(&config, cli.no_browser), None)
    };

    let receiver = CallbackReceiver::bind(DEFAULT_HOST, DEFAULT_PORT)?;
    let outcome = run_session(&plan, &ctx, receiver);
    drop(ctx);

    if let Some(session) = recording_session {
        match session.finish() {
            Ok(path) => info!(path = %path.display(), "cassette saved"),
            Err(e) => warn!(error = %e, "failed to save cassette"),
        }
    }

    outcome
}
