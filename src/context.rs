//! Service context that bundles all port trait objects.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::adapters::live::customers_canvas::{CanvasSettings, CustomersCanvasApi};
use crate::adapters::live::http_fetcher::HttpFetcher;
use crate::adapters::live::system_browser::{PrintUrl, SystemBrowser};
use crate::adapters::recording::canvas_api::RecordingCanvasApi;
use crate::adapters::recording::result_fetcher::RecordingResultFetcher;
use crate::adapters::replaying::canvas_api::ReplayingCanvasApi;
use crate::adapters::replaying::result_fetcher::ReplayingResultFetcher;
use crate::cassette::config::load_cassette;
use crate::cassette::recorder::{session_cassette_path, CassetteRecorder};
use crate::config::Config;
use crate::error::SaveError;
use crate::ports::{BrowserLauncher, CanvasApi, ResultFetcher};

/// Directory recorded sessions are written under.
const CASSETTE_ROOT: &str = ".canvas-save/cassettes";

/// Bundles all port trait objects into a single context.
pub struct ServiceContext {
    /// Customer's Canvas API port.
    pub canvas: Box<dyn CanvasApi>,
    /// Downloads save results delivered by reference.
    pub fetcher: Box<dyn ResultFetcher>,
    /// Opens the launch URL.
    pub launcher: Box<dyn BrowserLauncher>,
}

/// Handle to a recording session that must be finished after use.
pub struct RecordingSession {
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingSession {
    /// Finish the recording and write the cassette file to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be written.
    pub fn finish(self) -> Result<PathBuf, String> {
        let recorder = Arc::try_unwrap(self.recorder)
            .map_err(|_| "Recording adapters still hold the recorder".to_string())?
            .into_inner()
            .map_err(|e| format!("Recorder lock poisoned: {e}"))?;
        recorder.finish().map_err(|e| format!("Failed to write cassette: {e}"))
    }
}

fn launcher(config: &Config, no_browser: bool) -> Box<dyn BrowserLauncher> {
    if no_browser {
        Box::new(PrintUrl)
    } else {
        Box::new(SystemBrowser::new(config.browser.command.clone()))
    }
}

impl ServiceContext {
    /// Create a live context talking to the configured tenant.
    #[must_use]
    pub fn live(config: &Config, no_browser: bool) -> Self {
        Self {
            canvas: Box::new(CustomersCanvasApi::new(CanvasSettings::from_config(config))),
            fetcher: Box::new(HttpFetcher::new()),
            launcher: launcher(config, no_browser),
        }
    }

    /// Create a recording context that wraps the live adapters with a recorder.
    #[must_use]
    pub fn recording(config: &Config, no_browser: bool) -> (Self, RecordingSession) {
        let live = Self::live(config, no_browser);

        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let path = session_cassette_path(Path::new(CASSETTE_ROOT), &timestamp);
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(
            path,
            format!("{timestamp}-session"),
            get_commit_hash(),
        )));

        let ctx = Self {
            canvas: Box::new(RecordingCanvasApi::new(live.canvas, Arc::clone(&recorder))),
            fetcher: Box::new(RecordingResultFetcher::new(live.fetcher, Arc::clone(&recorder))),
            launcher: live.launcher,
        };
        (ctx, RecordingSession { recorder })
    }

    /// Create a replaying context from a cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be loaded.
    pub fn replaying(path: &Path, config: &Config, no_browser: bool) -> Result<Self, SaveError> {
        let replayer = Arc::new(Mutex::new(load_cassette(path)?));
        Ok(Self {
            canvas: Box::new(ReplayingCanvasApi::new(Arc::clone(&replayer))),
            fetcher: Box::new(ReplayingResultFetcher::new(replayer)),
            launcher: launcher(config, no_browser),
        })
    }
}

/// Get the current git commit hash, or "unknown" if unavailable.
fn get_commit_hash() -> String {
    std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map_or_else(|| "unknown".to_string(), |s| s.trim().to_string())
}
