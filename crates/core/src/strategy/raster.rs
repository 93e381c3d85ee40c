//! In-process raster re-encoding.

use async_trait::async_trait;
use image::DynamicImage;
use std::io::Cursor;

use super::error::ConversionError;
use super::traits::{write_artifact, ConversionJob, ConversionStrategy};
use crate::format::{RasterCodec, TargetFormat};

/// Re-encodes raster data to the target codec via the `image` crate.
pub struct RasterTranscodeStrategy;

impl RasterTranscodeStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RasterTranscodeStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversionStrategy for RasterTranscodeStrategy {
    fn name(&self) -> &'static str {
        "image_to_image"
    }

    async fn execute(&self, job: &ConversionJob) -> Result<u64, ConversionError> {
        let TargetFormat::Raster(codec) = job.target else {
            return Err(ConversionError::UnsupportedCodec {
                target: job.target.to_string(),
            });
        };

        let bytes = tokio::fs::read(&job.input_path).await?;
        let encoded = tokio::task::spawn_blocking(move || transcode(&bytes, codec))
            .await
            .map_err(|e| ConversionError::backend(format!("transcode task panicked: {}", e)))??;

        write_artifact(&job.output_path, &encoded).await
    }
}

/// Decodes the source bytes and re-encodes them with the requested codec.
pub(crate) fn transcode(bytes: &[u8], codec: RasterCodec) -> Result<Vec<u8>, ConversionError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| ConversionError::backend(format!("decode: {}", e)))?;

    encode(&img, codec)
}

/// Encodes a decoded image with the requested codec, normalizing the pixel
/// layout where an encoder is picky about it (JPEG rejects alpha, the WebP
/// encoder only takes 8-bit RGB/RGBA).
pub(crate) fn encode(img: &DynamicImage, codec: RasterCodec) -> Result<Vec<u8>, ConversionError> {
    let normalized;
    let to_encode: &DynamicImage = match codec {
        RasterCodec::Jpeg => {
            normalized = DynamicImage::ImageRgb8(img.to_rgb8());
            &normalized
        }
        RasterCodec::Webp => {
            normalized = DynamicImage::ImageRgba8(img.to_rgba8());
            &normalized
        }
        _ => img,
    };

    let mut out = Cursor::new(Vec::new());
    to_encode
        .write_to(&mut out, codec.image_format())
        .map_err(|e| ConversionError::backend(format!("encode {}: {}", codec.extension(), e)))?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::sniff_image;
    use crate::format::SniffedFormat;
    use crate::testing::fixtures;

    fn job(dir: &std::path::Path, input: &str, output: &str, target: TargetFormat) -> ConversionJob {
        ConversionJob {
            input_path: dir.join(input),
            output_path: dir.join(output),
            media_type: "image/png".to_string(),
            target,
        }
    }

    #[tokio::test]
    async fn test_png_to_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("in.png"), fixtures::sample_png())
            .await
            .unwrap();

        let strategy = RasterTranscodeStrategy::new();
        let job = job(
            dir.path(),
            "in.png",
            "out.jpeg",
            TargetFormat::Raster(RasterCodec::Jpeg),
        );
        let size = strategy.execute(&job).await.unwrap();

        assert!(size > 0);
        let out = std::fs::read(job.output_path).unwrap();
        assert_eq!(sniff_image(&out), SniffedFormat::Jpeg);
    }

    #[tokio::test]
    async fn test_jpeg_to_png() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("in.jpeg"), fixtures::sample_jpeg())
            .await
            .unwrap();

        let strategy = RasterTranscodeStrategy::new();
        let job = job(
            dir.path(),
            "in.jpeg",
            "out.png",
            TargetFormat::Raster(RasterCodec::Png),
        );
        strategy.execute(&job).await.unwrap();

        let out = std::fs::read(job.output_path).unwrap();
        assert_eq!(sniff_image(&out), SniffedFormat::Png);
    }

    #[tokio::test]
    async fn test_every_raster_codec_encodes() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("in.png"), fixtures::sample_png())
            .await
            .unwrap();

        let strategy = RasterTranscodeStrategy::new();
        for codec in [
            RasterCodec::Jpeg,
            RasterCodec::Png,
            RasterCodec::Gif,
            RasterCodec::Tiff,
            RasterCodec::Webp,
            RasterCodec::Bmp,
        ] {
            let output = format!("out.{}", codec.extension());
            let job = job(dir.path(), "in.png", &output, TargetFormat::Raster(codec));
            let size = strategy.execute(&job).await.unwrap();
            assert!(size > 0, "{} output should be non-empty", codec.extension());
        }
    }

    #[tokio::test]
    async fn test_non_raster_target_is_unsupported_codec() {
        let dir = tempfile::tempdir().unwrap();
        let strategy = RasterTranscodeStrategy::new();
        let job = job(dir.path(), "in.png", "out.pdf", TargetFormat::Pdf);

        let err = strategy.execute(&job).await.unwrap_err();
        assert!(matches!(err, ConversionError::UnsupportedCodec { .. }));
        assert!(!job.output_path.exists());
    }

    #[tokio::test]
    async fn test_malformed_input_is_backend_failure() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("in.png"), b"definitely not an image")
            .await
            .unwrap();

        let strategy = RasterTranscodeStrategy::new();
        let job = job(
            dir.path(),
            "in.png",
            "out.jpeg",
            TargetFormat::Raster(RasterCodec::Jpeg),
        );
        let err = strategy.execute(&job).await.unwrap_err();

        assert!(matches!(err, ConversionError::BackendFailure { .. }));
        assert!(!job.output_path.exists(), "no output on failure");
    }

    #[tokio::test]
    async fn test_missing_input_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let strategy = RasterTranscodeStrategy::new();
        let job = job(
            dir.path(),
            "missing.png",
            "out.jpeg",
            TargetFormat::Raster(RasterCodec::Jpeg),
        );
        let err = strategy.execute(&job).await.unwrap_err();
        assert!(matches!(err, ConversionError::Io(_)));
    }
}
