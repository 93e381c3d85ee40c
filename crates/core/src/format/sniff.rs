//! Magic-byte detection for raster sub-formats.
//!
//! The PDF embed strategy branches on the *actual* content of the upload, not
//! on its declared media type, because each sub-format needs a distinct
//! pre-normalization step before it can be embedded.

/// Concrete raster sub-format detected from leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SniffedFormat {
    Jpeg,
    Png,
    Gif,
    Tiff,
    Webp,
    Bmp,
    /// Radiance HDR (`#?RADIANCE` / `#?RGBE`).
    Hdr,
    /// DirectDraw Surface texture container.
    Dds,
    /// HEIC/HEIF ISO-BMFF container.
    Heif,
    Unknown,
}

impl SniffedFormat {
    /// Short label used in error messages and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Tiff => "tiff",
            Self::Webp => "webp",
            Self::Bmp => "bmp",
            Self::Hdr => "hdr",
            Self::Dds => "dds",
            Self::Heif => "heif",
            Self::Unknown => "unknown",
        }
    }
}

const HEIF_BRANDS: &[&[u8; 4]] = &[b"heic", b"heix", b"heif", b"hevc", b"mif1", b"msf1"];

/// Identifies a raster sub-format from its magic bytes.
pub fn sniff_image(bytes: &[u8]) -> SniffedFormat {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return SniffedFormat::Jpeg;
    }
    if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        return SniffedFormat::Png;
    }
    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        return SniffedFormat::Gif;
    }
    if bytes.starts_with(&[0x49, 0x49, 0x2A, 0x00]) || bytes.starts_with(&[0x4D, 0x4D, 0x00, 0x2A])
    {
        return SniffedFormat::Tiff;
    }
    if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
        return SniffedFormat::Webp;
    }
    if bytes.starts_with(b"#?RADIANCE") || bytes.starts_with(b"#?RGBE") {
        return SniffedFormat::Hdr;
    }
    if bytes.starts_with(b"DDS ") {
        return SniffedFormat::Dds;
    }
    if bytes.len() >= 12 && &bytes[4..8] == b"ftyp" {
        let brand: &[u8] = &bytes[8..12];
        if HEIF_BRANDS.iter().any(|b| brand == b.as_slice()) {
            return SniffedFormat::Heif;
        }
    }
    // BMP last: "BM" is a weak two-byte signature.
    if bytes.starts_with(b"BM") {
        return SniffedFormat::Bmp;
    }
    SniffedFormat::Unknown
}
