//! Single-page PDF assembly with the source raster embedded full-page.

use async_trait::async_trait;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use super::error::ConversionError;
use super::heif;
use super::traits::{write_artifact, ConversionJob, ConversionStrategy};
use crate::format::{sniff_image, SniffedFormat};

/// Embeds the uploaded raster as a single full-page image in a one-page PDF.
///
/// The concrete sub-format is sniffed from the bytes, because each class
/// needs a different pre-normalization before it is PDF-embeddable: JPEG
/// passes through as a DCT stream, plain rasters decode to RGB, Radiance HDR
/// is tone-clamped to 8-bit, DDS textures go through the container decoder,
/// and HEIC goes through the dedicated transcoder.
pub struct PdfEmbedStrategy;

impl PdfEmbedStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfEmbedStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversionStrategy for PdfEmbedStrategy {
    fn name(&self) -> &'static str {
        "image_to_pdf"
    }

    async fn execute(&self, job: &ConversionJob) -> Result<u64, ConversionError> {
        let bytes = tokio::fs::read(&job.input_path).await?;
        let pdf = tokio::task::spawn_blocking(move || build_pdf(&bytes))
            .await
            .map_err(|e| ConversionError::backend(format!("embed task panicked: {}", e)))??;

        write_artifact(&job.output_path, &pdf).await
    }
}

/// The embeddable payload after pre-normalization.
enum EmbeddedImage {
    /// JPEG bytes passed through unchanged (DCTDecode).
    Jpeg {
        data: Vec<u8>,
        width: u32,
        height: u32,
    },
    /// Raw interleaved RGB8 (FlateDecode).
    Rgb {
        data: Vec<u8>,
        width: u32,
        height: u32,
    },
}

fn build_pdf(bytes: &[u8]) -> Result<Vec<u8>, ConversionError> {
    let embedded = normalize(bytes)?;
    serialize_pdf(embedded)
}

fn normalize(bytes: &[u8]) -> Result<EmbeddedImage, ConversionError> {
    let sniffed = sniff_image(bytes);
    match sniffed {
        SniffedFormat::Jpeg => {
            // Dimensions come from a decode, the stream stays untouched.
            let img = image::load_from_memory(bytes)
                .map_err(|e| ConversionError::backend(format!("decode jpeg: {}", e)))?;
            Ok(EmbeddedImage::Jpeg {
                data: bytes.to_vec(),
                width: img.width(),
                height: img.height(),
            })
        }
        SniffedFormat::Png
        | SniffedFormat::Gif
        | SniffedFormat::Tiff
        | SniffedFormat::Webp
        | SniffedFormat::Bmp
        // Radiance HDR decodes through the same path; to_rgb8 clamps it to
        // displayable 8-bit.
        | SniffedFormat::Hdr
        // DDS needs the container decoder but lands on the same RGB payload.
        | SniffedFormat::Dds => {
            let img = image::load_from_memory(bytes).map_err(|e| {
                ConversionError::backend(format!("decode {}: {}", sniffed.label(), e))
            })?;
            let rgb = img.to_rgb8();
            Ok(EmbeddedImage::Rgb {
                width: rgb.width(),
                height: rgb.height(),
                data: rgb.into_raw(),
            })
        }
        SniffedFormat::Heif => {
            let (data, width, height) = heif::decode_heif_to_rgb(bytes)?;
            Ok(EmbeddedImage::Rgb {
                data,
                width,
                height,
            })
        }
        SniffedFormat::Unknown => Err(ConversionError::UnsupportedEmbedSource {
            detected: sniffed.label().to_string(),
        }),
    }
}

/// Serializes a one-page document whose media box matches the image size.
fn serialize_pdf(embedded: EmbeddedImage) -> Result<Vec<u8>, ConversionError> {
    let pdf_err = |e: lopdf::Error| ConversionError::backend(format!("pdf assembly: {}", e));

    let (width, height) = match &embedded {
        EmbeddedImage::Jpeg { width, height, .. } => (*width, *height),
        EmbeddedImage::Rgb { width, height, .. } => (*width, *height),
    };

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let image_stream = match embedded {
        EmbeddedImage::Jpeg {
            data,
            width,
            height,
        } => Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width as i64,
                "Height" => height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            data,
        ),
        EmbeddedImage::Rgb {
            data,
            width,
            height,
        } => {
            let mut stream = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => width as i64,
                    "Height" => height as i64,
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8,
                },
                data,
            );
            stream.compress().map_err(pdf_err)?;
            stream
        }
    };
    let image_id = doc.add_object(image_stream);

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    (width as f32).into(),
                    0.into(),
                    0.into(),
                    (height as f32).into(),
                    0.into(),
                    0.into(),
                ],
            ),
            Operation::new("Do", vec!["Im0".into()]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        content.encode().map_err(pdf_err)?,
    ));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
            0.into(),
            0.into(),
            (width as f32).into(),
            (height as f32).into(),
        ],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! { "Im0" => image_id },
        },
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| ConversionError::backend(format!("pdf assembly: {}", e)))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::TargetFormat;
    use crate::testing::fixtures;

    fn job(dir: &std::path::Path, input: &str) -> ConversionJob {
        ConversionJob {
            input_path: dir.join(input),
            output_path: dir.join("out.pdf"),
            media_type: "image/png".to_string(),
            target: TargetFormat::Pdf,
        }
    }

    #[tokio::test]
    async fn test_png_embeds_into_pdf() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("in.png"), fixtures::sample_png())
            .await
            .unwrap();

        let strategy = PdfEmbedStrategy::new();
        let size = strategy.execute(&job(dir.path(), "in.png")).await.unwrap();
        assert!(size > 0);

        let out = std::fs::read(dir.path().join("out.pdf")).unwrap();
        assert!(out.starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn test_jpeg_passthrough_embeds_original_stream() {
        let dir = tempfile::tempdir().unwrap();
        let jpeg = fixtures::sample_jpeg();
        tokio::fs::write(dir.path().join("in.jpeg"), &jpeg)
            .await
            .unwrap();

        let strategy = PdfEmbedStrategy::new();
        strategy.execute(&job(dir.path(), "in.jpeg")).await.unwrap();

        let out = std::fs::read(dir.path().join("out.pdf")).unwrap();
        assert!(out.starts_with(b"%PDF-"));
        // DCT passthrough keeps the original JPEG bytes inside the document.
        assert!(out
            .windows(jpeg.len().min(64))
            .any(|w| w == &jpeg[..jpeg.len().min(64)]));
    }

    #[tokio::test]
    async fn test_unknown_sub_format_is_unsupported_embed_source() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("in.bin"), b"not an image at all")
            .await
            .unwrap();

        let strategy = PdfEmbedStrategy::new();
        let err = strategy
            .execute(&job(dir.path(), "in.bin"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ConversionError::UnsupportedEmbedSource { .. }
        ));
        assert!(!dir.path().join("out.pdf").exists());
    }

    #[test]
    fn test_normalize_png_produces_rgb_payload() {
        let embedded = normalize(&fixtures::sample_png()).unwrap();
        match embedded {
            EmbeddedImage::Rgb {
                data,
                width,
                height,
            } => {
                assert_eq!(data.len(), (width * height * 3) as usize);
            }
            EmbeddedImage::Jpeg { .. } => panic!("png must not embed as jpeg"),
        }
    }

    #[test]
    fn test_serialized_pdf_page_matches_image_size() {
        let embedded = EmbeddedImage::Rgb {
            data: vec![255; 4 * 2 * 3],
            width: 4,
            height: 2,
        };
        let pdf = serialize_pdf(embedded).unwrap();
        let doc = lopdf::Document::load_mem(&pdf).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }
}
