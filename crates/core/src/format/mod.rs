//! Format classification for uploaded artifacts.
//!
//! This module owns the two closed vocabularies the rest of the crate
//! dispatches on: the [`SourceKind`] derived once per request from the
//! declared media type, and the [`TargetFormat`] parsed from the request
//! token. Classification is pure and performs no I/O.

mod classifier;
mod sniff;
mod types;

pub use classifier::classify_media_type;
pub use sniff::{sniff_image, SniffedFormat};
pub use types::{RasterCodec, SourceKind, TargetFormat};
