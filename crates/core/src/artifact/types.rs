use std::path::PathBuf;

use serde::Serialize;

/// An immutable conversion request, as handed to the orchestrator.
///
/// The request id is the sole source of uniqueness for derived artifact
/// names; the original filename is only decorative.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    /// Unique id for this request (UUID v4).
    pub request_id: String,
    /// Path of the uploaded input artifact.
    pub input_path: PathBuf,
    /// Declared media type of the upload (may be empty).
    pub media_type: String,
    /// Original filename as sent by the client.
    pub original_filename: String,
    /// Requested target format token, unparsed.
    pub target: String,
}

impl ConversionRequest {
    pub fn new(
        request_id: impl Into<String>,
        input_path: PathBuf,
        media_type: impl Into<String>,
        original_filename: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            input_path,
            media_type: media_type.into(),
            original_filename: original_filename.into(),
            target: target.into(),
        }
    }
}

/// A successfully produced output artifact.
#[derive(Debug, Clone, Serialize)]
pub struct Artifact {
    /// Path of the output file in the storage directory.
    pub output_path: PathBuf,
    /// Bare filename under the download surface.
    pub output_filename: String,
    /// Size of the output in bytes (always non-zero).
    pub size_bytes: u64,
    /// Wall-clock conversion time in milliseconds.
    pub duration_ms: u64,
    /// Name of the strategy that produced the artifact.
    pub strategy: &'static str,
}
