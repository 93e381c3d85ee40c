use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while rendering markup.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Renderer binary not found.
    #[error("Renderer not found at path: {path}")]
    RendererNotFound { path: PathBuf },

    /// Renderer exited non-zero.
    #[error("Render failed (status {status:?}): {stderr}")]
    RenderFailed {
        status: Option<i32>,
        stderr: String,
    },

    /// Renderer exited zero but the expected output is absent.
    #[error("Renderer produced no output at {path}")]
    MissingOutput { path: PathBuf },

    /// Render timed out.
    #[error("Render timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// I/O error during rendering.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
