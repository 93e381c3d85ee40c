//! Headless markup rendering backend.
//!
//! Document conversions that need layout (docx to pdf, docx to raster) pipe
//! their extracted HTML through a [`MarkupRenderer`]. The only production
//! implementation shells out to a headless chromium; the invocation is fully
//! awaited, its exit status checked, and its output verified before success
//! is reported.

mod chromium;
mod config;
mod error;
mod traits;

pub use chromium::ChromiumRenderer;
pub use config::RenderConfig;
pub use error::RenderError;
pub use traits::MarkupRenderer;
