use async_trait::async_trait;
use std::path::Path;

use super::error::RenderError;

/// A backend that lays out HTML and produces a PDF or a raster snapshot.
///
/// Implementations must be fully awaited: when a call returns `Ok(())` the
/// output file exists at `output_path` and is complete. On error no file may
/// remain at `output_path`.
#[async_trait]
pub trait MarkupRenderer: Send + Sync {
    /// Returns the name of this renderer implementation.
    fn name(&self) -> &str;

    /// Renders the HTML document to a PDF at `output_path`.
    async fn render_pdf(&self, html: &str, output_path: &Path) -> Result<(), RenderError>;

    /// Renders the HTML document to a full-page PNG at `output_path`.
    async fn render_screenshot(&self, html: &str, output_path: &Path) -> Result<(), RenderError>;
}
