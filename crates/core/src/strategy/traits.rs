//! Trait definitions for conversion strategies.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::error::ConversionError;
use crate::format::TargetFormat;

/// One unit of conversion work, resolved by the orchestrator before any
/// strategy runs.
#[derive(Debug, Clone)]
pub struct ConversionJob {
    /// Path of the uploaded input artifact.
    pub input_path: PathBuf,
    /// Final output path the strategy must produce.
    pub output_path: PathBuf,
    /// Declared media type of the input.
    pub media_type: String,
    /// Parsed target format.
    pub target: TargetFormat,
}

/// A self-contained conversion routine bound to one class of
/// (source kind, target format) pairs.
///
/// Contract: on success exactly one complete file exists at
/// `job.output_path` and the returned value is its size in bytes. On error
/// no file may remain at that path; strategies that stream through external
/// processes clean up their own partial output.
#[async_trait]
pub trait ConversionStrategy: Send + Sync {
    /// Returns the name of this strategy (used in logs and audit events).
    fn name(&self) -> &'static str;

    /// Executes the conversion.
    async fn execute(&self, job: &ConversionJob) -> Result<u64, ConversionError>;
}

/// Writes a fully materialized artifact to its final path.
///
/// In-process strategies encode entirely in memory and call this once at the
/// end, which is what keeps partial output off the disk on failure.
pub(crate) async fn write_artifact(path: &Path, bytes: &[u8]) -> Result<u64, ConversionError> {
    tokio::fs::write(path, bytes).await?;
    Ok(bytes.len() as u64)
}
