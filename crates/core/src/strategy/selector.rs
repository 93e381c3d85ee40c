//! Total strategy selection over the (source kind, target format) table.

use std::sync::Arc;

use super::document::{DocumentMarkupStrategy, DocumentPdfStrategy, DocumentRasterStrategy};
use super::external::{OfficeConfig, OfficeProcessStrategy};
use super::heif::HeifTranscodeStrategy;
use super::office_embed::OfficeEmbedStrategy;
use super::pdf_embed::PdfEmbedStrategy;
use super::pixels::PixelContainerStrategy;
use super::raster::RasterTranscodeStrategy;
use super::traits::ConversionStrategy;
use crate::format::{SourceKind, TargetFormat};
use crate::render::MarkupRenderer;

/// Result of strategy selection.
pub enum Selection {
    /// Exactly one strategy handles the pair.
    Strategy(Arc<dyn ConversionStrategy>),
    /// No strategy exists for the pair.
    Unsupported,
}

/// Maps every (source kind, target format) pair to exactly one strategy, or
/// to `Unsupported`.
///
/// The mapping is an exhaustive match over the two closed enums, so totality
/// is checked by the compiler rather than at startup. Selection performs no
/// side effects; nothing touches the filesystem until a strategy is
/// committed to.
pub struct StrategySelector {
    raster: Arc<dyn ConversionStrategy>,
    pdf_embed: Arc<dyn ConversionStrategy>,
    office_embed: Arc<dyn ConversionStrategy>,
    pixels: Arc<dyn ConversionStrategy>,
    heif: Arc<dyn ConversionStrategy>,
    document_markup: Arc<dyn ConversionStrategy>,
    document_pdf: Arc<dyn ConversionStrategy>,
    document_raster: Arc<dyn ConversionStrategy>,
    office_process: Arc<dyn ConversionStrategy>,
}

impl StrategySelector {
    /// Wires the production strategy set around the injected renderer and
    /// office-converter configuration.
    pub fn new(renderer: Arc<dyn MarkupRenderer>, office_config: OfficeConfig) -> Self {
        Self {
            raster: Arc::new(RasterTranscodeStrategy::new()),
            pdf_embed: Arc::new(PdfEmbedStrategy::new()),
            office_embed: Arc::new(OfficeEmbedStrategy::new()),
            pixels: Arc::new(PixelContainerStrategy::new()),
            heif: Arc::new(HeifTranscodeStrategy::new()),
            document_markup: Arc::new(DocumentMarkupStrategy::new()),
            document_pdf: Arc::new(DocumentPdfStrategy::new(Arc::clone(&renderer))),
            document_raster: Arc::new(DocumentRasterStrategy::new(renderer)),
            office_process: Arc::new(OfficeProcessStrategy::new(office_config)),
        }
    }

    /// Selects the strategy for a pair.
    ///
    /// Word-processor sources only convert to markup, pdf, or raster
    /// targets; everything else is `Unsupported` rather than silently
    /// falling through to an image strategy. `Unknown` sources dispatch like
    /// images (the classifier's deliberate permissiveness).
    pub fn select(&self, kind: SourceKind, target: TargetFormat) -> Selection {
        use SourceKind::*;
        use TargetFormat::*;

        let strategy = match (kind, target) {
            (WordProcessorDocument, Html) => &self.document_markup,
            (WordProcessorDocument, Pdf) => &self.document_pdf,
            (WordProcessorDocument, Raster(_)) => &self.document_raster,
            (WordProcessorDocument, Docx | Pptx | Odp | Dds | Heic | Rgb) => {
                return Selection::Unsupported
            }

            (ImageLike | Unknown, Raster(_)) => &self.raster,
            (ImageLike | Unknown, Pdf) => &self.pdf_embed,
            (ImageLike | Unknown, Docx | Pptx) => &self.office_embed,
            (ImageLike | Unknown, Dds | Rgb) => &self.pixels,
            (ImageLike | Unknown, Heic) => &self.heif,
            (ImageLike | Unknown, Odp) => &self.office_process,
            (ImageLike | Unknown, Html) => return Selection::Unsupported,
        };
        Selection::Strategy(Arc::clone(strategy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::RasterCodec;
    use crate::testing::MockRenderer;

    fn selector() -> StrategySelector {
        StrategySelector::new(Arc::new(MockRenderer::new()), OfficeConfig::default())
    }

    fn selected_name(selector: &StrategySelector, kind: SourceKind, target: TargetFormat) -> &str {
        match selector.select(kind, target) {
            Selection::Strategy(s) => s.name(),
            Selection::Unsupported => "unsupported",
        }
    }

    #[test]
    fn test_image_pairs() {
        let s = selector();
        let kind = SourceKind::ImageLike;
        assert_eq!(
            selected_name(&s, kind, TargetFormat::Raster(RasterCodec::Jpeg)),
            "image_to_image"
        );
        assert_eq!(selected_name(&s, kind, TargetFormat::Pdf), "image_to_pdf");
        assert_eq!(
            selected_name(&s, kind, TargetFormat::Docx),
            "image_to_office"
        );
        assert_eq!(
            selected_name(&s, kind, TargetFormat::Pptx),
            "image_to_office"
        );
        assert_eq!(selected_name(&s, kind, TargetFormat::Dds), "image_to_pixels");
        assert_eq!(selected_name(&s, kind, TargetFormat::Rgb), "image_to_pixels");
        assert_eq!(selected_name(&s, kind, TargetFormat::Heic), "image_to_heif");
        assert_eq!(
            selected_name(&s, kind, TargetFormat::Odp),
            "office_process"
        );
        assert_eq!(selected_name(&s, kind, TargetFormat::Html), "unsupported");
    }

    #[test]
    fn test_document_pairs() {
        let s = selector();
        let kind = SourceKind::WordProcessorDocument;
        assert_eq!(
            selected_name(&s, kind, TargetFormat::Html),
            "document_to_markup"
        );
        assert_eq!(
            selected_name(&s, kind, TargetFormat::Pdf),
            "document_to_pdf"
        );
        assert_eq!(
            selected_name(&s, kind, TargetFormat::Raster(RasterCodec::Webp)),
            "document_to_raster"
        );
    }

    #[test]
    fn test_document_never_falls_through_to_image_strategies() {
        let s = selector();
        let kind = SourceKind::WordProcessorDocument;
        for target in [
            TargetFormat::Docx,
            TargetFormat::Pptx,
            TargetFormat::Odp,
            TargetFormat::Dds,
            TargetFormat::Heic,
            TargetFormat::Rgb,
        ] {
            assert!(
                matches!(s.select(kind, target), Selection::Unsupported),
                "document to {} must be unsupported",
                target
            );
        }
    }

    #[test]
    fn test_unknown_kind_dispatches_like_image() {
        let s = selector();
        for target in TargetFormat::all() {
            let unknown = selected_name(&s, SourceKind::Unknown, target).to_string();
            let image = selected_name(&s, SourceKind::ImageLike, target).to_string();
            assert_eq!(unknown, image, "target {}", target);
        }
    }

    #[test]
    fn test_selection_is_total_over_the_full_table() {
        let s = selector();
        for kind in [
            SourceKind::ImageLike,
            SourceKind::WordProcessorDocument,
            SourceKind::Unknown,
        ] {
            for target in TargetFormat::all() {
                // Every pair resolves without panicking; a pair is either a
                // strategy or explicitly unsupported.
                let _ = s.select(kind, target);
            }
        }
    }
}
