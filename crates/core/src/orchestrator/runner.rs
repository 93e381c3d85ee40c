use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::artifact::{Artifact, ArtifactNamer, CleanupHandle, ConversionRequest};
use crate::audit::{AuditEvent, AuditHandle};
use crate::format::{classify_media_type, TargetFormat};
use crate::strategy::{ConversionError, ConversionJob, Selection, StrategySelector};

/// Outcome of one orchestrated conversion.
pub type ConversionOutcome = Result<Artifact, ConversionError>;

/// Drives a conversion request to a terminal state.
///
/// Dependencies are injected once at construction and shared across
/// requests; the orchestrator itself holds no per-request state.
pub struct Orchestrator {
    selector: StrategySelector,
    namer: Arc<ArtifactNamer>,
    cleanup: CleanupHandle,
    audit: Option<AuditHandle>,
}

impl Orchestrator {
    pub fn new(
        selector: StrategySelector,
        namer: Arc<ArtifactNamer>,
        cleanup: CleanupHandle,
    ) -> Self {
        Self {
            selector,
            namer,
            cleanup,
            audit: None,
        }
    }

    pub fn with_audit(mut self, audit: AuditHandle) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Runs one request to a terminal state.
    ///
    /// Input cleanup is scheduled unconditionally once the terminal state is
    /// reached, success or failure, and is independent of the response
    /// already having been sent.
    pub async fn convert(&self, request: &ConversionRequest) -> ConversionOutcome {
        let started = Instant::now();

        if let Some(ref audit) = self.audit {
            audit
                .emit(AuditEvent::ConversionRequested {
                    request_id: request.request_id.clone(),
                    original_filename: request.original_filename.clone(),
                    media_type: request.media_type.clone(),
                    target_format: request.target.clone(),
                })
                .await;
        }

        let result = self.run(request, started).await;

        // Terminal state reached: the input artifact is no longer needed.
        self.cleanup
            .schedule(request.request_id.clone(), request.input_path.clone())
            .await;

        let duration_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(artifact) => {
                info!(
                    request_id = %request.request_id,
                    strategy = artifact.strategy,
                    output = %artifact.output_filename,
                    size_bytes = artifact.size_bytes,
                    duration_ms,
                    "Conversion succeeded"
                );
                if let Some(ref audit) = self.audit {
                    audit
                        .emit(AuditEvent::ConversionCompleted {
                            request_id: request.request_id.clone(),
                            strategy: artifact.strategy.to_string(),
                            output_filename: artifact.output_filename.clone(),
                            output_bytes: artifact.size_bytes,
                            duration_ms,
                        })
                        .await;
                }
            }
            Err(e) => {
                warn!(
                    request_id = %request.request_id,
                    target = %request.target,
                    duration_ms,
                    "Conversion failed: {}",
                    e
                );
                if let Some(ref audit) = self.audit {
                    audit
                        .emit(AuditEvent::ConversionFailed {
                            request_id: request.request_id.clone(),
                            strategy: selected_strategy_name(&self.selector, request),
                            error: e.to_string(),
                            duration_ms,
                        })
                        .await;
                }
            }
        }

        result
    }

    async fn run(
        &self,
        request: &ConversionRequest,
        started: Instant,
    ) -> Result<Artifact, ConversionError> {
        // Received -> Classified
        if tokio::fs::metadata(&request.input_path).await.is_err() {
            return Err(ConversionError::backend(format!(
                "input artifact missing: {}",
                request.input_path.display()
            )));
        }

        let kind = classify_media_type(&request.media_type);
        debug!(request_id = %request.request_id, %kind, "Request classified");

        // Classified -> StrategySelected; an unknown token or an absent pair
        // goes straight to Failed without entering Executing.
        let Some(target) = TargetFormat::parse(&request.target) else {
            return Err(ConversionError::UnsupportedFormat {
                source_kind: kind,
                target: request.target.clone(),
            });
        };

        let strategy = match self.selector.select(kind, target) {
            Selection::Strategy(strategy) => strategy,
            Selection::Unsupported => {
                return Err(ConversionError::UnsupportedFormat {
                    source_kind: kind,
                    target: request.target.clone(),
                });
            }
        };
        debug!(
            request_id = %request.request_id,
            strategy = strategy.name(),
            "Strategy selected"
        );

        let (output_path, output_filename) =
            self.namer
                .output_paths(&request.request_id, &request.original_filename, target);
        let job = ConversionJob {
            input_path: request.input_path.clone(),
            output_path: output_path.clone(),
            media_type: request.media_type.clone(),
            target,
        };

        // StrategySelected -> Executing. Every strategy step is awaited to
        // completion, external processes included, before success is
        // reported.
        strategy.execute(&job).await?;

        // Executing -> Succeeded only with a verified, non-empty artifact.
        let meta = tokio::fs::metadata(&output_path).await.map_err(|_| {
            ConversionError::backend(format!(
                "strategy reported success but output is missing: {}",
                output_path.display()
            ))
        })?;
        if meta.len() == 0 {
            return Err(ConversionError::backend(format!(
                "strategy produced an empty artifact: {}",
                output_path.display()
            )));
        }

        Ok(Artifact {
            output_path,
            output_filename,
            size_bytes: meta.len(),
            duration_ms: started.elapsed().as_millis() as u64,
            strategy: strategy.name(),
        })
    }
}

/// Best-effort strategy attribution for failure audit events.
fn selected_strategy_name(
    selector: &StrategySelector,
    request: &ConversionRequest,
) -> Option<String> {
    let kind = classify_media_type(&request.media_type);
    let target = TargetFormat::parse(&request.target)?;
    match selector.select(kind, target) {
        Selection::Strategy(strategy) => Some(strategy.name().to_string()),
        Selection::Unsupported => None,
    }
}
