//! Error taxonomy for conversion strategies.

use thiserror::Error;

use crate::format::SourceKind;
use crate::markup::MarkupError;
use crate::render::RenderError;

/// Errors that can occur while orchestrating or executing a conversion.
///
/// Every variant is distinguishable in logs and audit records; the HTTP
/// surface collapses all of them except `MissingInput` into a single generic
/// failure.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// No strategy exists for the (source kind, target) pair.
    #[error("No conversion from {source_kind} source to '{target}'")]
    UnsupportedFormat {
        source_kind: SourceKind,
        target: String,
    },

    /// Pair dispatched to the raster strategy, but the target is not a
    /// raster codec.
    #[error("Target '{target}' is not a known raster codec")]
    UnsupportedCodec { target: String },

    /// Pair is nominally supported but the concrete sub-format is not.
    #[error("Unrecognized embed source format: {detected}")]
    UnsupportedEmbedSource { detected: String },

    /// No file was attached to the request.
    #[error("No input file attached")]
    MissingInput,

    /// An underlying library raised during the transform.
    #[error("Conversion backend failed: {reason}")]
    BackendFailure { reason: String },

    /// An external converter exited non-zero or produced no output.
    #[error("External process '{program}' failed (status {status:?}): {stderr}")]
    ExternalProcessFailure {
        program: String,
        status: Option<i32>,
        stderr: String,
    },

    /// A strategy step exceeded its deadline.
    #[error("Conversion timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// I/O error during conversion.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConversionError {
    /// Creates a backend failure with the given reason.
    pub fn backend(reason: impl Into<String>) -> Self {
        Self::BackendFailure {
            reason: reason.into(),
        }
    }

    /// Whether the caller (not the service) is at fault. Drives the 400/500
    /// split at the HTTP boundary.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MissingInput)
    }
}

impl From<MarkupError> for ConversionError {
    fn from(e: MarkupError) -> Self {
        Self::BackendFailure {
            reason: format!("markup extraction: {}", e),
        }
    }
}

impl From<RenderError> for ConversionError {
    fn from(e: RenderError) -> Self {
        match e {
            RenderError::RendererNotFound { path } => Self::ExternalProcessFailure {
                program: path.display().to_string(),
                status: None,
                stderr: "executable not found".to_string(),
            },
            RenderError::RenderFailed { status, stderr } => Self::ExternalProcessFailure {
                program: "renderer".to_string(),
                status,
                stderr,
            },
            RenderError::MissingOutput { path } => Self::ExternalProcessFailure {
                program: "renderer".to_string(),
                status: Some(0),
                stderr: format!("expected output missing: {}", path.display()),
            },
            RenderError::Timeout { timeout_secs } => Self::Timeout { timeout_secs },
            RenderError::Io(e) => Self::Io(e),
        }
    }
}
