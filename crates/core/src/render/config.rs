use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the headless chromium renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Path to the chromium binary.
    #[serde(default = "default_chromium_path")]
    pub chromium_path: PathBuf,

    /// Timeout for a single render in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Viewport width for screenshots, in pixels.
    #[serde(default = "default_window_width")]
    pub window_width: u32,

    /// Viewport height for screenshots, in pixels.
    #[serde(default = "default_window_height")]
    pub window_height: u32,

    /// Additional chromium arguments.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_chromium_path() -> PathBuf {
    PathBuf::from("chromium")
}

fn default_timeout() -> u64 {
    60
}

fn default_window_width() -> u32 {
    1280
}

fn default_window_height() -> u32 {
    1696 // A4 aspect at 1280px width
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            chromium_path: default_chromium_path(),
            timeout_secs: default_timeout(),
            window_width: default_window_width(),
            window_height: default_window_height(),
            extra_args: Vec::new(),
        }
    }
}

impl RenderConfig {
    /// Creates a config with a custom chromium path.
    pub fn with_path(chromium_path: PathBuf) -> Self {
        Self {
            chromium_path,
            ..Default::default()
        }
    }

    /// Sets the timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RenderConfig::default();
        assert_eq!(config.chromium_path, PathBuf::from("chromium"));
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.window_width, 1280);
    }

    #[test]
    fn test_config_builder() {
        let config =
            RenderConfig::with_path(PathBuf::from("/usr/bin/chromium-browser")).with_timeout(10);
        assert_eq!(
            config.chromium_path,
            PathBuf::from("/usr/bin/chromium-browser")
        );
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn test_config_serialization() {
        let config = RenderConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: RenderConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.timeout_secs, config.timeout_secs);
    }
}
