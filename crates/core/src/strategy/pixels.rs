//! Explicit pixel-buffer container encoding.
//!
//! These targets cannot be produced by a codec pass-through: the pixel data
//! is renormalized and written into a container that wants explicit width,
//! height and a raw buffer (DDS), or dumped as bare interleaved RGB8.

use async_trait::async_trait;
use ddsfile::{AlphaMode, D3D10ResourceDimension, Dds, DxgiFormat, NewDxgiParams};

use super::error::ConversionError;
use super::traits::{write_artifact, ConversionJob, ConversionStrategy};
use crate::format::TargetFormat;

/// Encodes decoded pixel data into a DDS texture container or a raw RGB dump.
pub struct PixelContainerStrategy;

impl PixelContainerStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PixelContainerStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversionStrategy for PixelContainerStrategy {
    fn name(&self) -> &'static str {
        "image_to_pixels"
    }

    async fn execute(&self, job: &ConversionJob) -> Result<u64, ConversionError> {
        let target = job.target;
        let bytes = tokio::fs::read(&job.input_path).await?;
        let encoded = tokio::task::spawn_blocking(move || {
            let img = image::load_from_memory(&bytes)
                .map_err(|e| ConversionError::backend(format!("decode: {}", e)))?;
            match target {
                TargetFormat::Dds => encode_dds(&img),
                TargetFormat::Rgb => Ok(img.to_rgb8().into_raw()),
                other => Err(ConversionError::backend(format!(
                    "pixel container strategy cannot produce '{}'",
                    other
                ))),
            }
        })
        .await
        .map_err(|e| ConversionError::backend(format!("container task panicked: {}", e)))??;

        write_artifact(&job.output_path, &encoded).await
    }
}

/// Renormalizes to RGBA8 and writes an uncompressed DDS texture.
fn encode_dds(img: &image::DynamicImage) -> Result<Vec<u8>, ConversionError> {
    let rgba = img.to_rgba8();
    let (width, height) = (rgba.width(), rgba.height());

    let mut dds = Dds::new_dxgi(NewDxgiParams {
        height,
        width,
        depth: None,
        format: DxgiFormat::R8G8B8A8_UNorm,
        mipmap_levels: None,
        array_layers: None,
        caps2: None,
        is_cubemap: false,
        resource_dimension: D3D10ResourceDimension::Texture2D,
        alpha_mode: AlphaMode::Straight,
    })
    .map_err(|e| ConversionError::backend(format!("dds header: {}", e)))?;
    dds.data = rgba.into_raw();

    let mut out = Vec::new();
    dds.write(&mut out)
        .map_err(|e| ConversionError::backend(format!("dds write: {}", e)))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    fn job(dir: &std::path::Path, output: &str, target: TargetFormat) -> ConversionJob {
        ConversionJob {
            input_path: dir.join("in.png"),
            output_path: dir.join(output),
            media_type: "image/png".to_string(),
            target,
        }
    }

    #[tokio::test]
    async fn test_dds_output_has_container_magic() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("in.png"), fixtures::sample_png())
            .await
            .unwrap();

        let strategy = PixelContainerStrategy::new();
        let job = job(dir.path(), "out.dds", TargetFormat::Dds);
        let size = strategy.execute(&job).await.unwrap();

        assert!(size > 128, "header plus pixel data");
        let out = std::fs::read(job.output_path).unwrap();
        assert_eq!(&out[..4], b"DDS ");
    }

    #[tokio::test]
    async fn test_rgb_output_is_exactly_pixel_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let png = fixtures::sample_png();
        let decoded = image::load_from_memory(&png).unwrap();
        let expected_len = (decoded.width() * decoded.height() * 3) as u64;

        tokio::fs::write(dir.path().join("in.png"), &png).await.unwrap();

        let strategy = PixelContainerStrategy::new();
        let job = job(dir.path(), "out.rgb", TargetFormat::Rgb);
        let size = strategy.execute(&job).await.unwrap();

        assert_eq!(size, expected_len);
    }

    #[tokio::test]
    async fn test_undecodable_input_is_backend_failure() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("in.png"), b"nope").await.unwrap();

        let strategy = PixelContainerStrategy::new();
        let job = job(dir.path(), "out.dds", TargetFormat::Dds);
        let err = strategy.execute(&job).await.unwrap_err();

        assert!(matches!(err, ConversionError::BackendFailure { .. }));
        assert!(!job.output_path.exists());
    }
}
