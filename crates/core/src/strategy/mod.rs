//! Conversion strategies and their selector.
//!
//! One strategy per class of (source kind, target format) pairs:
//!
//! - [`RasterTranscodeStrategy`]: in-process raster re-encode
//! - [`PdfEmbedStrategy`]: single-page PDF with the raster embedded
//! - [`OfficeEmbedStrategy`]: minimal docx/pptx with an embedded picture
//! - [`PixelContainerStrategy`]: DDS texture container / raw RGB dump
//! - [`HeifTranscodeStrategy`]: bridge to the high-efficiency photo codec
//! - [`DocumentMarkupStrategy`] / [`DocumentPdfStrategy`] /
//!   [`DocumentRasterStrategy`]: docx extraction, optionally rendered
//! - [`OfficeProcessStrategy`]: out-of-process LibreOffice conversion
//!
//! The [`StrategySelector`] is the only way pairs resolve to strategies.

mod document;
mod error;
mod external;
mod heif;
mod office_embed;
mod pdf_embed;
mod pixels;
mod raster;
mod selector;
mod traits;

pub use document::{DocumentMarkupStrategy, DocumentPdfStrategy, DocumentRasterStrategy};
pub use error::ConversionError;
pub use external::{OfficeConfig, OfficeProcessStrategy};
pub use heif::HeifTranscodeStrategy;
pub use office_embed::OfficeEmbedStrategy;
pub use pdf_embed::PdfEmbedStrategy;
pub use pixels::PixelContainerStrategy;
pub use raster::RasterTranscodeStrategy;
pub use selector::{Selection, StrategySelector};
pub use traits::{ConversionJob, ConversionStrategy};
