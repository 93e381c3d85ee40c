//! Bridge to the high-efficiency photo codec.
//!
//! The primary raster backend cannot read or write HEIC, so both directions
//! go through libheif: encoding here, decoding on behalf of the PDF embed
//! strategy.

use async_trait::async_trait;
use libheif_rs::{
    Channel, ColorSpace, CompressionFormat, EncoderQuality, HeifContext, Image, LibHeif, RgbChroma,
};

use super::error::ConversionError;
use super::traits::{write_artifact, ConversionJob, ConversionStrategy};

/// Transcodes a raster upload into the HEIC container.
pub struct HeifTranscodeStrategy;

impl HeifTranscodeStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HeifTranscodeStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversionStrategy for HeifTranscodeStrategy {
    fn name(&self) -> &'static str {
        "image_to_heif"
    }

    async fn execute(&self, job: &ConversionJob) -> Result<u64, ConversionError> {
        let bytes = tokio::fs::read(&job.input_path).await?;
        let encoded = tokio::task::spawn_blocking(move || {
            let img = image::load_from_memory(&bytes)
                .map_err(|e| ConversionError::backend(format!("decode: {}", e)))?;
            let rgb = img.to_rgb8();
            encode_rgb_to_heif(rgb.as_raw(), rgb.width(), rgb.height())
        })
        .await
        .map_err(|e| ConversionError::backend(format!("heif task panicked: {}", e)))??;

        write_artifact(&job.output_path, &encoded).await
    }
}

fn heif_err(e: libheif_rs::HeifError) -> ConversionError {
    ConversionError::backend(format!("heif: {}", e))
}

/// Encodes interleaved RGB8 pixels into a HEIC container.
pub(crate) fn encode_rgb_to_heif(
    rgb: &[u8],
    width: u32,
    height: u32,
) -> Result<Vec<u8>, ConversionError> {
    let lib_heif = LibHeif::new();

    let mut image = Image::new(width, height, ColorSpace::Rgb(RgbChroma::Rgb)).map_err(heif_err)?;
    image
        .create_plane(Channel::Interleaved, width, height, 24)
        .map_err(heif_err)?;

    let planes = image.planes_mut();
    let plane = planes
        .interleaved
        .ok_or_else(|| ConversionError::backend("heif: no interleaved plane"))?;
    let stride = plane.stride;
    let row = width as usize * 3;
    for (y, chunk) in rgb.chunks_exact(row).enumerate() {
        plane.data[y * stride..y * stride + row].copy_from_slice(chunk);
    }

    let mut context = HeifContext::new().map_err(heif_err)?;
    let mut encoder = lib_heif
        .encoder_for_format(CompressionFormat::Hevc)
        .map_err(heif_err)?;
    encoder
        .set_quality(EncoderQuality::Lossy(90))
        .map_err(heif_err)?;
    context
        .encode_image(&image, &mut encoder, None)
        .map_err(heif_err)?;

    context.write_to_bytes().map_err(heif_err)
}

/// Decodes a HEIC container into interleaved RGB8 pixels.
pub(crate) fn decode_heif_to_rgb(bytes: &[u8]) -> Result<(Vec<u8>, u32, u32), ConversionError> {
    let lib_heif = LibHeif::new();
    let context = HeifContext::read_from_bytes(bytes).map_err(heif_err)?;
    let handle = context.primary_image_handle().map_err(heif_err)?;
    let image = lib_heif
        .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)
        .map_err(heif_err)?;

    let width = image.width();
    let height = image.height();
    let planes = image.planes();
    let plane = planes
        .interleaved
        .ok_or_else(|| ConversionError::backend("heif: no interleaved plane"))?;

    let stride = plane.stride;
    let row = width as usize * 3;
    let mut out = Vec::with_capacity(row * height as usize);
    for y in 0..height as usize {
        out.extend_from_slice(&plane.data[y * stride..y * stride + row]);
    }
    Ok((out, width, height))
}
