pub mod artifact;
pub mod audit;
pub mod config;
pub mod format;
pub mod markup;
pub mod orchestrator;
pub mod render;
pub mod strategy;
pub mod testing;

pub use artifact::{
    create_cleanup_queue, Artifact, ArtifactNamer, CleanupHandle, CleanupWorker,
    ConversionRequest, ExpirySweeper,
};
pub use audit::{
    create_audit_system, AuditError, AuditEvent, AuditFilter, AuditHandle, AuditRecord,
    AuditStore, AuditWriter, SqliteAuditStore,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use format::{classify_media_type, RasterCodec, SourceKind, TargetFormat};
pub use orchestrator::{ConversionOutcome, Orchestrator};
pub use render::{ChromiumRenderer, MarkupRenderer, RenderConfig};
pub use strategy::{
    ConversionError, ConversionJob, ConversionStrategy, OfficeConfig, Selection, StrategySelector,
};
