use async_trait::async_trait;
use std::path::Path;
use std::sync::Mutex;

use crate::render::{MarkupRenderer, RenderError};
use crate::testing::fixtures;

/// In-memory renderer double.
///
/// Writes placeholder output instantly and records every page it was asked
/// to render. Screenshot output is a real PNG so downstream transcoding
/// keeps working in tests.
pub struct MockRenderer {
    pages: Mutex<Vec<String>>,
    fail: bool,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self {
            pages: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    /// A renderer that fails every call with a non-zero exit.
    pub fn failing() -> Self {
        Self {
            pages: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Pages rendered so far, in call order.
    pub fn rendered_pages(&self) -> Vec<String> {
        self.pages.lock().unwrap().clone()
    }

    fn record(&self, html: &str) -> Result<(), RenderError> {
        if self.fail {
            return Err(RenderError::RenderFailed {
                status: Some(1),
                stderr: "mock renderer failure".to_string(),
            });
        }
        self.pages.lock().unwrap().push(html.to_string());
        Ok(())
    }
}

impl Default for MockRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarkupRenderer for MockRenderer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn render_pdf(&self, html: &str, output_path: &Path) -> Result<(), RenderError> {
        self.record(html)?;
        tokio::fs::write(output_path, b"%PDF-1.4\n% mock render\n%%EOF\n").await?;
        Ok(())
    }

    async fn render_screenshot(&self, html: &str, output_path: &Path) -> Result<(), RenderError> {
        self.record(html)?;
        tokio::fs::write(output_path, fixtures::sample_png()).await?;
        Ok(())
    }
}
