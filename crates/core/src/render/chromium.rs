//! Headless chromium renderer implementation.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::debug;

use super::config::RenderConfig;
use super::error::RenderError;
use super::traits::MarkupRenderer;

enum RenderMode {
    Pdf,
    Screenshot,
}

/// Renders markup by invoking a headless chromium process.
pub struct ChromiumRenderer {
    config: RenderConfig,
}

impl ChromiumRenderer {
    /// Creates a new renderer with the given configuration.
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Creates a renderer with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(RenderConfig::default())
    }

    /// Builds the chromium argument list for one invocation.
    fn build_args(&self, mode: &RenderMode, input_url: &str, output_path: &Path) -> Vec<String> {
        let mut args = vec![
            "--headless=new".to_string(),
            "--disable-gpu".to_string(),
            "--no-sandbox".to_string(),
            "--hide-scrollbars".to_string(),
        ];

        match mode {
            RenderMode::Pdf => {
                args.push("--no-pdf-header-footer".to_string());
                args.push(format!("--print-to-pdf={}", output_path.display()));
            }
            RenderMode::Screenshot => {
                args.push(format!(
                    "--window-size={},{}",
                    self.config.window_width, self.config.window_height
                ));
                args.push(format!("--screenshot={}", output_path.display()));
            }
        }

        args.extend(self.config.extra_args.iter().cloned());
        args.push(input_url.to_string());
        args
    }

    async fn render(
        &self,
        mode: RenderMode,
        html: &str,
        output_path: &Path,
    ) -> Result<(), RenderError> {
        // Chromium wants a URL, so the page goes through a sibling temp file.
        let html_path = sibling_html_path(output_path);
        tokio::fs::write(&html_path, html).await?;

        let input_url = format!("file://{}", html_path.display());
        let args = self.build_args(&mode, &input_url, output_path);
        debug!(renderer = %self.config.chromium_path.display(), ?args, "Invoking renderer");

        let result = self.run_process(&args, output_path).await;

        if let Err(e) = tokio::fs::remove_file(&html_path).await {
            debug!("Failed to remove render input page: {}", e);
        }

        result
    }

    async fn run_process(&self, args: &[String], output_path: &Path) -> Result<(), RenderError> {
        let output_future = Command::new(&self.config.chromium_path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        let output = match timeout(timeout_duration, output_future).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RenderError::RendererNotFound {
                    path: self.config.chromium_path.clone(),
                });
            }
            Ok(Err(e)) => return Err(RenderError::Io(e)),
            Err(_) => {
                remove_partial(output_path).await;
                return Err(RenderError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                });
            }
        };

        if !output.status.success() {
            remove_partial(output_path).await;
            return Err(RenderError::RenderFailed {
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        // A zero exit does not guarantee a file was written.
        match tokio::fs::metadata(output_path).await {
            Ok(meta) if meta.len() > 0 => Ok(()),
            _ => Err(RenderError::MissingOutput {
                path: output_path.to_path_buf(),
            }),
        }
    }
}

fn sibling_html_path(output_path: &Path) -> PathBuf {
    let mut name = output_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "render".to_string());
    name.push_str(".src.html");
    output_path.with_file_name(name)
}

async fn remove_partial(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), "Failed to remove partial render output: {}", e);
        }
    }
}

#[async_trait]
impl MarkupRenderer for ChromiumRenderer {
    fn name(&self) -> &str {
        "chromium"
    }

    async fn render_pdf(&self, html: &str, output_path: &Path) -> Result<(), RenderError> {
        self.render(RenderMode::Pdf, html, output_path).await
    }

    async fn render_screenshot(&self, html: &str, output_path: &Path) -> Result<(), RenderError> {
        self.render(RenderMode::Screenshot, html, output_path).await
    }
}
