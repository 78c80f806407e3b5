//! Live browser launchers.

use std::process::{Command, Stdio};

use tracing::info;

use crate::error::SaveError;
use crate::ports::browser::BrowserLauncher;

/// Opens URLs with the configured browser command or the platform opener.
pub struct SystemBrowser {
    command: Option<String>,
}

impl SystemBrowser {
    /// Create a launcher; `command` overrides the platform opener.
    #[must_use]
    pub fn new(command: Option<String>) -> Self {
        Self { command }
    }

    fn command_for(&self, url: &str) -> Command {
        if let Some(ref program) = self.command {
            let mut cmd = Command::new(program);
            cmd.arg(url);
            return cmd;
        }
        platform_opener(url)
    }
}

#[cfg(target_os = "macos")]
fn platform_opener(url: &str) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(url);
    cmd
}

#[cfg(target_os = "windows")]
fn platform_opener(url: &str) -> Command {
    let mut cmd = Command::new("cmd");
    // The empty string is the window title consumed by `start`.
    cmd.args(["/C", "start", "", url]);
    cmd
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn platform_opener(url: &str) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(url);
    cmd
}

impl BrowserLauncher for SystemBrowser {
    fn launch(&self, url: &str) -> Result<(), SaveError> {
        let mut cmd = self.command_for(url);
        let program = cmd.get_program().to_string_lossy().into_owned();
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| SaveError::Launch(format!("{program}: {e}")))?;
        info!(%program, "browser launched");
        Ok(())
    }
}

/// Prints the launch URL instead of opening a browser (`--no-browser`).
pub struct PrintUrl;

impl BrowserLauncher for PrintUrl {
    fn launch(&self, url: &str) -> Result<(), SaveError> {
        eprintln!("Open this URL in your browser: {url}");
        Ok(())
    }
}
