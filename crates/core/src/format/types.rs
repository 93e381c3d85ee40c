use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse classification of an uploaded artifact, derived from its declared
/// media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Anything with a non-empty media type that is not a known word-processor
    /// document. Deliberately permissive: unsupported inputs fail later inside
    /// the image decoder rather than at classification time.
    ImageLike,
    /// A word-processor document (exact media type match).
    WordProcessorDocument,
    /// No usable media type was declared.
    Unknown,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ImageLike => "image",
            Self::WordProcessorDocument => "document",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// Raster codecs the in-process image backend can encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RasterCodec {
    Jpeg,
    Png,
    Gif,
    Tiff,
    Webp,
    Bmp,
}

impl RasterCodec {
    /// Canonical file extension for this codec.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Tiff => "tiff",
            Self::Webp => "webp",
            Self::Bmp => "bmp",
        }
    }

    /// The `image` crate format used to encode this codec.
    pub fn image_format(&self) -> image::ImageFormat {
        match self {
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Png => image::ImageFormat::Png,
            Self::Gif => image::ImageFormat::Gif,
            Self::Tiff => image::ImageFormat::Tiff,
            Self::Webp => image::ImageFormat::WebP,
            Self::Bmp => image::ImageFormat::Bmp,
        }
    }
}

/// The closed set of conversion targets the service dispatches on.
///
/// Parsing is total over strings: unrecognized tokens yield `None`, never a
/// default variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFormat {
    /// Plain raster re-encode.
    Raster(RasterCodec),
    /// Single-page PDF with the source embedded full-page.
    Pdf,
    /// Word-processor container with the source as an embedded picture.
    Docx,
    /// Presentation container with the source as an embedded picture.
    Pptx,
    /// Presentation container produced by the external office converter.
    Odp,
    /// Legacy texture container (explicit width/height/pixel-buffer).
    Dds,
    /// High-efficiency photo codec, bridged through a dedicated transcoder.
    Heic,
    /// Raw interleaved RGB8 pixel dump.
    Rgb,
    /// Structural markup extracted from a word-processor document.
    Html,
}

impl TargetFormat {
    /// Every token `parse` recognizes, in a stable order. Exposed over the
    /// formats API and iterated by the selector totality tests.
    pub const TOKENS: &'static [&'static str] = &[
        "jpeg", "jpg", "jfif", "png", "gif", "tiff", "webp", "bmp", "pdf", "docx", "pptx", "odp",
        "dds", "heic", "heif", "rgb", "html",
    ];

    /// Parses a request token into a target format.
    ///
    /// `jpg` and `jfif` are legacy aliases for JPEG; `heif` aliases the HEIC
    /// container. Anything else is unrecognized.
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" | "jfif" => Some(Self::Raster(RasterCodec::Jpeg)),
            "png" => Some(Self::Raster(RasterCodec::Png)),
            "gif" => Some(Self::Raster(RasterCodec::Gif)),
            "tiff" => Some(Self::Raster(RasterCodec::Tiff)),
            "webp" => Some(Self::Raster(RasterCodec::Webp)),
            "bmp" => Some(Self::Raster(RasterCodec::Bmp)),
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "pptx" => Some(Self::Pptx),
            "odp" => Some(Self::Odp),
            "dds" => Some(Self::Dds),
            "heic" | "heif" => Some(Self::Heic),
            "rgb" => Some(Self::Rgb),
            "html" => Some(Self::Html),
            _ => None,
        }
    }

    /// Canonical file extension for output artifacts of this target.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Raster(codec) => codec.extension(),
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Pptx => "pptx",
            Self::Odp => "odp",
            Self::Dds => "dds",
            Self::Heic => "heic",
            Self::Rgb => "rgb",
            Self::Html => "html",
        }
    }

    /// All variants, used to exercise the selector over the full table.
    pub fn all() -> Vec<Self> {
        let mut formats: Vec<Self> = vec![
            Self::Pdf,
            Self::Docx,
            Self::Pptx,
            Self::Odp,
            Self::Dds,
            Self::Heic,
            Self::Rgb,
            Self::Html,
        ];
        for codec in [
            RasterCodec::Jpeg,
            RasterCodec::Png,
            RasterCodec::Gif,
            RasterCodec::Tiff,
            RasterCodec::Webp,
            RasterCodec::Bmp,
        ] {
            formats.push(Self::Raster(codec));
        }
        formats
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}
