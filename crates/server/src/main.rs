use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use morpho_core::{
    create_audit_system, create_cleanup_queue, load_config, validate_config, ArtifactNamer,
    AuditEvent, AuditStore, ChromiumRenderer, Config, ExpirySweeper, MarkupRenderer, Orchestrator,
    SqliteAuditStore, StrategySelector,
};

use morpho_server::api::create_router;
use morpho_server::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Buffer size for audit event channel
const AUDIT_BUFFER_SIZE: usize = 1000;

/// Buffer size for the input cleanup queue
const CLEANUP_BUFFER_SIZE: usize = 256;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("MORPHO_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration; a missing file runs on defaults
    let config = if config_path.exists() {
        info!("Loading configuration from {:?}", config_path);
        load_config(&config_path)
            .with_context(|| format!("Failed to load config from {:?}", config_path))?
    } else {
        info!("No config file at {:?}, using defaults", config_path);
        Config::default()
    };

    validate_config(&config).context("Configuration validation failed")?;
    info!("Configuration loaded successfully");
    info!("Storage dir: {:?}", config.storage.dir);
    info!("Database path: {:?}", config.database.path);

    // Ensure the storage directory exists before anything touches it
    tokio::fs::create_dir_all(&config.storage.dir)
        .await
        .with_context(|| format!("Failed to create storage dir {:?}", config.storage.dir))?;

    // Compute config hash for audit
    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    let config_hash_short = &config_hash[..16];

    // Create SQLite audit store
    let audit_store: Arc<dyn AuditStore> = Arc::new(
        SqliteAuditStore::new(&config.database.path).context("Failed to create audit store")?,
    );
    info!("Audit store initialized");

    // Create audit system and spawn the writer task
    let (audit_handle, audit_writer) =
        create_audit_system(Arc::clone(&audit_store), AUDIT_BUFFER_SIZE);
    let writer_handle = tokio::spawn(audit_writer.run());

    audit_handle
        .emit(AuditEvent::ServiceStarted {
            version: VERSION.to_string(),
            config_hash: config_hash_short.to_string(),
        })
        .await;
    info!("Emitted ServiceStarted audit event");

    // Create the input cleanup queue and spawn its worker
    let (cleanup_handle, cleanup_worker) = create_cleanup_queue(
        Duration::from_secs(config.storage.cleanup_grace_secs),
        CLEANUP_BUFFER_SIZE,
        Some(audit_handle.clone()),
    );
    tokio::spawn(cleanup_worker.run());
    info!("Cleanup worker started");

    // Spawn the artifact expiry sweeper
    let sweeper = ExpirySweeper::new(
        config.storage.dir.clone(),
        Duration::from_secs(config.storage.retention_secs),
        Duration::from_secs(config.storage.sweep_interval_secs),
    )
    .with_audit(audit_handle.clone());
    tokio::spawn(sweeper.run());
    info!("Expiry sweeper started");

    // Wire the orchestrator: renderer and office converter are constructed
    // once here and injected, never referenced as globals
    let renderer: Arc<dyn MarkupRenderer> =
        Arc::new(ChromiumRenderer::new(config.renderer.clone()));
    info!("Using renderer: {:?}", config.renderer.chromium_path);

    let selector = StrategySelector::new(renderer, config.office.clone());

    let namer = Arc::new(ArtifactNamer::new(
        config.storage.dir.clone(),
        config.server.resolved_public_url(),
    ));

    let orchestrator = Arc::new(
        Orchestrator::new(selector, Arc::clone(&namer), cleanup_handle)
            .with_audit(audit_handle.clone()),
    );
    info!("Orchestrator initialized");

    // Create app state and router
    let state = Arc::new(AppState::new(
        config.clone(),
        orchestrator,
        namer,
        audit_store,
    ));
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Emit ServiceStopped event
    info!("Server shutting down...");
    audit_handle
        .emit(AuditEvent::ServiceStopped {
            reason: "graceful_shutdown".to_string(),
        })
        .await;

    // Drop our handle and give the writer a bounded window to flush. The
    // cleanup worker and sweeper still hold clones inside detached tasks,
    // so the channel only closes when those die with the runtime.
    drop(audit_handle);
    let _ = tokio::time::timeout(Duration::from_secs(5), writer_handle).await;
    info!("Audit writer stopped");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
