//! Artifact lifecycle: naming, deferred input cleanup, and output expiry.
//!
//! Input artifacts are created by upload handling, consumed by a strategy,
//! and deleted by the background cleanup worker after a grace period. Output
//! artifacts live in the storage directory until the expiry sweeper removes
//! them.

mod cleanup;
mod expiry;
mod namer;
mod types;

pub use cleanup::{create_cleanup_queue, CleanupHandle, CleanupRequest, CleanupWorker};
pub use expiry::ExpirySweeper;
pub use namer::ArtifactNamer;
pub use types::{Artifact, ConversionRequest};
