//! Configuration file loading with environment variable overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Customer's Canvas tenant and API settings.
    #[serde(default)]
    pub canvas: CanvasConfig,

    /// Editor session settings.
    #[serde(default)]
    pub editor: EditorConfig,

    /// Rendering pipeline settings for saved state files.
    #[serde(default)]
    pub render: RenderConfig,

    /// Browser launch settings.
    #[serde(default)]
    pub browser: BrowserConfig,
}

/// Customer's Canvas tenant and API settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Storefront ID registered for this integration.
    pub storefront_id: Option<u64>,
    /// External app client ID (client credentials flow).
    pub client_id: Option<String>,
    /// External app secret.
    pub client_secret: Option<String>,
    /// Identity server token endpoint.
    pub auth_url: String,
    /// API gateway base address.
    pub api_url: String,
    /// Design Editor base address; discovered from the tenant when unset.
    pub design_editor_url: Option<String>,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            storefront_id: None,
            client_id: None,
            client_secret: None,
            auth_url: "https://customerscanvashub.com/connect/token".to_string(),
            api_url: "https://api.customerscanvashub.com".to_string(),
            design_editor_url: None,
        }
    }
}

/// Editor session settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// User ID in your system that owns uploads and saved results.
    pub user_id: String,
    /// Design ID opened by the template program.
    pub template_id: Option<String>,
    /// Blank canvas width in points.
    pub width: u32,
    /// Blank canvas height in points.
    pub height: u32,
    /// Page the browser is pointed at; the local editor page when unset.
    pub launch_url: Option<String>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            user_id: "some_user_id_12345".to_string(),
            template_id: None,
            width: 800,
            height: 600,
            launch_url: None,
        }
    }
}

/// Rendering pipeline settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Output format requested from the pipeline.
    pub format: String,
    /// Output color space.
    pub color_space: String,
    /// Output resolution.
    pub dpi: u32,
    /// Seconds between processing-result checks.
    pub poll_interval_secs: u64,
    /// Number of processing-result checks before giving up.
    pub max_polls: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            format: "Pdf".to_string(),
            color_space: "Cmyk".to_string(),
            dpi: 300,
            poll_interval_secs: 3,
            max_polls: 20,
        }
    }
}

impl RenderConfig {
    /// Delay between processing-result checks.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// Browser launch settings.
#[derive(Debug, Default, Deserialize)]
pub struct BrowserConfig {
    /// Program used to open the launch URL instead of the platform opener.
    pub command: Option<String>,
}

impl Config {
    /// Load configuration from the given path, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
    }

    /// Get the client ID, preferring environment variable.
    #[must_use]
    pub fn client_id(&self) -> Option<String> {
        std::env::var("CANVAS_SAVE_CLIENT_ID").ok().or_else(|| self.canvas.client_id.clone())
    }

    /// Get the client secret, preferring environment variable.
    #[must_use]
    pub fn client_secret(&self) -> Option<String> {
        std::env::var("CANVAS_SAVE_CLIENT_SECRET")
            .ok()
            .or_else(|| self.canvas.client_secret.clone())
    }
}

/// Discover the config file path using the resolution order:
/// 1. Explicit path (from `--config` flag)
/// 2. `CANVAS_SAVE_CONFIG` environment variable
/// 3. `~/.config/canvas-save/config.toml`
#[must_use]
pub fn discover_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }

    if let Ok(p) = std::env::var("CANVAS_SAVE_CONFIG") {
        return PathBuf::from(p);
    }

    default_config_path()
}

fn default_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config/canvas-save/config.toml")
    } else {
        PathBuf::from("canvas-save.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert!(config.canvas.client_id.is_none());
        assert!(config.canvas.storefront_id.is_none());
        assert_eq!(config.canvas.auth_url, "https://customerscanvashub.com/connect/token");
        assert_eq!(config.editor.width, 800);
        assert_eq!(config.editor.height, 600);
        assert_eq!(config.render.format, "Pdf");
        assert_eq!(config.render.color_space, "Cmyk");
        assert_eq!(config.render.dpi, 300);
        assert_eq!(config.render.max_polls, 20);
        assert_eq!(config.render.poll_interval(), Duration::from_secs(3));
        assert!(config.browser.command.is_none());
    }

    #[test]
    fn load_nonexistent_returns_defaults() {
        let config = Config::load(Path::new("/nonexistent/path/config.toml")).unwrap();
        assert_eq!(config.editor.user_id, "some_user_id_12345");
    }

    #[test]
    fn load_valid_toml() {
        let dir = std::env::temp_dir().join("canvas_save_config_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(
            &path,
            r#"
[canvas]
storefront_id = 4242
client_id = "client"
client_secret = "secret"
api_url = "http://127.0.0.1:9999"

[editor]
user_id = "alice"
template_id = "T123"
width = 360

[render]
format = "Png"
poll_interval_secs = 0

[browser]
command = "firefox"
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.canvas.storefront_id, Some(4242));
        assert_eq!(config.canvas.client_id.as_deref(), Some("client"));
        assert_eq!(config.canvas.api_url, "http://127.0.0.1:9999");
        // Unset keys inside a present section keep their defaults
        assert_eq!(config.canvas.auth_url, "https://customerscanvashub.com/connect/token");
        assert_eq!(config.editor.user_id, "alice");
        assert_eq!(config.editor.template_id.as_deref(), Some("T123"));
        assert_eq!(config.editor.width, 360);
        assert_eq!(config.editor.height, 600);
        assert_eq!(config.render.format, "Png");
        assert_eq!(config.render.poll_interval(), Duration::ZERO);
        assert_eq!(config.render.dpi, 300);
        assert_eq!(config.browser.command.as_deref(), Some("firefox"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_invalid_toml() {
        let dir = std::env::temp_dir().join("canvas_save_config_bad_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.toml");
        std::fs::write(&path, "this is not valid toml {{{").unwrap();

        assert!(Config::load(&path).is_err());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn client_secret_from_file() {
        let config = Config {
            canvas: CanvasConfig { client_secret: Some("from-file".into()), ..CanvasConfig::default() },
            ..Config::default()
        };

        std::env::remove_var("CANVAS_SAVE_CLIENT_SECRET");
        assert_eq!(config.client_secret().as_deref(), Some("from-file"));
    }

    #[test]
    fn discover_explicit_path() {
        let path = discover_config_path(Some("/tmp/my-config.toml"));
        assert_eq!(path, PathBuf::from("/tmp/my-config.toml"));
    }
}
