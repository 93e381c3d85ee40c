use std::path::PathBuf;
use std::time::Duration;

use tracing::{info, warn};

use crate::audit::{AuditEvent, AuditHandle};

/// Periodically removes artifacts older than the configured retention age.
///
/// This is mechanical enforcement of a configured age over the storage
/// directory; it owns output artifacts once a response has been served, and
/// doubles as the backstop for any input artifact the cleanup queue missed.
pub struct ExpirySweeper {
    dir: PathBuf,
    max_age: Duration,
    interval: Duration,
    audit: Option<AuditHandle>,
}

impl ExpirySweeper {
    pub fn new(dir: impl Into<PathBuf>, max_age: Duration, interval: Duration) -> Self {
        Self {
            dir: dir.into(),
            max_age,
            interval,
            audit: None,
        }
    }

    pub fn with_audit(mut self, audit: AuditHandle) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Runs the sweep loop forever. Spawn with `tokio::spawn(sweeper.run())`.
    pub async fn run(self) {
        info!(
            dir = %self.dir.display(),
            "Expiry sweeper started (max age {:?}, interval {:?})",
            self.max_age,
            self.interval
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match self.sweep_once().await {
                Ok(0) => {}
                Ok(removed) => info!(removed, "Expired artifacts removed"),
                Err(e) => warn!("Expiry sweep failed: {}", e),
            }
        }
    }

    /// Removes every regular file in the storage directory older than the
    /// retention age. Returns how many files were removed.
    pub async fn sweep_once(&self) -> std::io::Result<usize> {
        let mut removed = 0;
        let mut entries = tokio::fs::read_dir(&self.dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let metadata = match entry.metadata().await {
                Ok(m) => m,
                Err(e) => {
                    warn!(path = %entry.path().display(), "Cannot stat artifact: {}", e);
                    continue;
                }
            };
            if !metadata.is_file() {
                continue;
            }

            let age = metadata
                .modified()
                .ok()
                .and_then(|m| m.elapsed().ok())
                .unwrap_or_default();
            if age < self.max_age {
                continue;
            }

            let path = entry.path();
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {
                    removed += 1;
                    if let Some(ref audit) = self.audit {
                        audit
                            .emit(AuditEvent::ArtifactExpired {
                                filename: entry.file_name().to_string_lossy().to_string(),
                                age_secs: age.as_secs(),
                            })
                            .await;
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), "Failed to expire artifact: {}", e),
            }
        }

        Ok(removed)
    }
}
