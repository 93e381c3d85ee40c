//! Structural markup extraction from word-processor documents.
//!
//! Word-processor conversions all start here: the document's body XML is
//! pulled out of its OOXML container and reduced to plain HTML, which is
//! either the final artifact (`html` target) or the input to the headless
//! renderer (`pdf` and raster targets).

mod docx;

pub use docx::{docx_to_html, wrap_html_page, MarkupError};
