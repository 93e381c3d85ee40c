use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::audit::{AuditEvent, AuditHandle};

/// A single input artifact scheduled for deferred removal.
#[derive(Debug, Clone)]
pub struct CleanupRequest {
    pub request_id: String,
    pub path: PathBuf,
}

/// Handle for scheduling input-artifact cleanup.
///
/// Cheaply cloneable. Scheduling never fails the caller: if the channel is
/// closed the error is logged and the artifact is left for the expiry
/// sweeper to collect.
#[derive(Clone)]
pub struct CleanupHandle {
    tx: mpsc::Sender<CleanupRequest>,
}

impl CleanupHandle {
    pub async fn schedule(&self, request_id: impl Into<String>, path: PathBuf) {
        let request = CleanupRequest {
            request_id: request_id.into(),
            path,
        };
        if let Err(e) = self.tx.send(request).await {
            error!("Failed to schedule input cleanup: {}", e);
        }
    }
}

/// Background task that removes input artifacts after a grace period.
///
/// The grace period exists so a file still held open by a strategy's
/// underlying library is not deleted out from under it. Each removal runs on
/// its own task, so a long grace period never delays other requests'
/// cleanup. Failures are logged and audited, never propagated.
pub struct CleanupWorker {
    rx: mpsc::Receiver<CleanupRequest>,
    grace: Duration,
    audit: Option<AuditHandle>,
}

impl CleanupWorker {
    /// Runs the worker until the channel closes. Spawn with
    /// `tokio::spawn(worker.run())`.
    pub async fn run(mut self) {
        info!("Cleanup worker started (grace period {:?})", self.grace);

        while let Some(request) = self.rx.recv().await {
            let grace = self.grace;
            let audit = self.audit.clone();
            tokio::spawn(async move {
                remove_after(grace, request, audit).await;
            });
        }

        info!("Cleanup worker shutting down");
    }
}

async fn remove_after(grace: Duration, request: CleanupRequest, audit: Option<AuditHandle>) {
    tokio::time::sleep(grace).await;

    match tokio::fs::remove_file(&request.path).await {
        Ok(()) => {
            info!(
                request_id = %request.request_id,
                path = %request.path.display(),
                "Input artifact removed"
            );
            if let Some(audit) = audit {
                audit
                    .emit(AuditEvent::InputCleanupCompleted {
                        request_id: request.request_id,
                        path: request.path.display().to_string(),
                    })
                    .await;
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(
                request_id = %request.request_id,
                path = %request.path.display(),
                "Input artifact already absent"
            );
        }
        Err(e) => {
            error!(
                request_id = %request.request_id,
                path = %request.path.display(),
                "Failed to remove input artifact: {}",
                e
            );
            if let Some(audit) = audit {
                audit
                    .emit(AuditEvent::InputCleanupFailed {
                        request_id: request.request_id,
                        path: request.path.display().to_string(),
                        error: e.to_string(),
                    })
                    .await;
            }
        }
    }
}

/// Creates the cleanup queue.
///
/// Returns the handle for scheduling and the worker to spawn as a background
/// task.
pub fn create_cleanup_queue(
    grace: Duration,
    buffer_size: usize,
    audit: Option<AuditHandle>,
) -> (CleanupHandle, CleanupWorker) {
    let (tx, rx) = mpsc::channel(buffer_size);
    let handle = CleanupHandle { tx };
    let worker = CleanupWorker { rx, grace, audit };
    (handle, worker)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scheduled_input_is_eventually_removed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload-test.png");
        tokio::fs::write(&path, b"data").await.unwrap();

        let (handle, worker) = create_cleanup_queue(Duration::from_millis(10), 8, None);
        let worker_handle = tokio::spawn(worker.run());

        handle.schedule("req-1", path.clone()).await;

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!path.exists(), "input should be removed after grace period");

        drop(handle);
        worker_handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_removal_waits_for_grace_period() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload-grace.png");
        tokio::fs::write(&path, b"data").await.unwrap();

        let (handle, worker) = create_cleanup_queue(Duration::from_millis(300), 8, None);
        tokio::spawn(worker.run());

        handle.schedule("req-1", path.clone()).await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(path.exists(), "input should survive until the grace elapses");

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_missing_file_does_not_crash_worker() {
        let dir = tempfile::tempdir().unwrap();
        let (handle, worker) = create_cleanup_queue(Duration::from_millis(5), 8, None);
        let worker_handle = tokio::spawn(worker.run());

        handle
            .schedule("req-1", dir.path().join("never-existed.bin"))
            .await;
        handle
            .schedule("req-2", dir.path().join("also-missing.bin"))
            .await;

        tokio::time::sleep(Duration::from_millis(100)).await;
        drop(handle);
        worker_handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_removing_input_leaves_sibling_output_alone() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("upload-req.png");
        let output = dir.path().join("photo-req.jpeg");
        tokio::fs::write(&input, b"in").await.unwrap();
        tokio::fs::write(&output, b"out").await.unwrap();

        let (handle, worker) = create_cleanup_queue(Duration::from_millis(5), 8, None);
        tokio::spawn(worker.run());

        handle.schedule("req", input.clone()).await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(!input.exists());
        assert!(output.exists(), "output artifact must be unaffected");
    }
}
