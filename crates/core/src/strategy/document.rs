//! Word-processor document conversions.
//!
//! All three strategies start from the same markup extraction; the pdf and
//! raster variants then pipe the page through the injected headless
//! renderer.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

use super::error::ConversionError;
use super::raster;
use super::traits::{write_artifact, ConversionJob, ConversionStrategy};
use crate::format::TargetFormat;
use crate::markup::{docx_to_html, wrap_html_page};
use crate::render::MarkupRenderer;

async fn extract_fragment(job: &ConversionJob) -> Result<String, ConversionError> {
    let bytes = tokio::fs::read(&job.input_path).await?;
    let fragment = tokio::task::spawn_blocking(move || docx_to_html(&bytes))
        .await
        .map_err(|e| ConversionError::backend(format!("extraction task panicked: {}", e)))??;
    Ok(fragment)
}

async fn output_size(path: &std::path::Path) -> Result<u64, ConversionError> {
    let meta = tokio::fs::metadata(path).await?;
    Ok(meta.len())
}

/// Extracts structural markup from the document and writes it as the final
/// artifact.
pub struct DocumentMarkupStrategy;

impl DocumentMarkupStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DocumentMarkupStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversionStrategy for DocumentMarkupStrategy {
    fn name(&self) -> &'static str {
        "document_to_markup"
    }

    async fn execute(&self, job: &ConversionJob) -> Result<u64, ConversionError> {
        let fragment = extract_fragment(job).await?;
        write_artifact(&job.output_path, fragment.as_bytes()).await
    }
}

/// Extracts markup and renders it to a PDF via the headless backend.
pub struct DocumentPdfStrategy {
    renderer: Arc<dyn MarkupRenderer>,
}

impl DocumentPdfStrategy {
    pub fn new(renderer: Arc<dyn MarkupRenderer>) -> Self {
        Self { renderer }
    }
}

#[async_trait]
impl ConversionStrategy for DocumentPdfStrategy {
    fn name(&self) -> &'static str {
        "document_to_pdf"
    }

    async fn execute(&self, job: &ConversionJob) -> Result<u64, ConversionError> {
        let fragment = extract_fragment(job).await?;
        let page = wrap_html_page(&fragment);
        self.renderer.render_pdf(&page, &job.output_path).await?;
        output_size(&job.output_path).await
    }
}

/// Extracts markup, screenshots it via the headless backend, and transcodes
/// the screenshot when the target codec is not PNG.
pub struct DocumentRasterStrategy {
    renderer: Arc<dyn MarkupRenderer>,
}

impl DocumentRasterStrategy {
    pub fn new(renderer: Arc<dyn MarkupRenderer>) -> Self {
        Self { renderer }
    }

    fn screenshot_path(job: &ConversionJob) -> PathBuf {
        let mut name = job
            .output_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "render".to_string());
        name.push_str(".shot.png");
        job.output_path.with_file_name(name)
    }
}

#[async_trait]
impl ConversionStrategy for DocumentRasterStrategy {
    fn name(&self) -> &'static str {
        "document_to_raster"
    }

    async fn execute(&self, job: &ConversionJob) -> Result<u64, ConversionError> {
        let TargetFormat::Raster(codec) = job.target else {
            return Err(ConversionError::UnsupportedCodec {
                target: job.target.to_string(),
            });
        };

        let fragment = extract_fragment(job).await?;
        let page = wrap_html_page(&fragment);

        let screenshot = Self::screenshot_path(job);
        self.renderer.render_screenshot(&page, &screenshot).await?;

        let result = async {
            if codec == crate::format::RasterCodec::Png {
                tokio::fs::rename(&screenshot, &job.output_path).await?;
                return output_size(&job.output_path).await;
            }

            let png = tokio::fs::read(&screenshot).await?;
            let encoded = tokio::task::spawn_blocking(move || raster::transcode(&png, codec))
                .await
                .map_err(|e| {
                    ConversionError::backend(format!("transcode task panicked: {}", e))
                })??;
            write_artifact(&job.output_path, &encoded).await
        }
        .await;

        // The intermediate screenshot never outlives the request.
        if let Err(e) = tokio::fs::remove_file(&screenshot).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    path = %screenshot.display(),
                    "Failed to remove intermediate screenshot: {}",
                    e
                );
            }
        }

        result
    }
}
