//! Common test utilities for driving the full router in-process.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use morpho_core::{
    create_audit_system, create_cleanup_queue, testing::MockRenderer, ArtifactNamer, AuditStore,
    Config, OfficeConfig, Orchestrator, SqliteAuditStore, StrategySelector,
};
use morpho_server::api::create_router;
use morpho_server::state::AppState;

pub struct TestFixture {
    pub router: Router,
    pub storage_dir: PathBuf,
    _temp_dir: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub bytes: Vec<u8>,
}

pub const MULTIPART_BOUNDARY: &str = "X-MORPHO-TEST-BOUNDARY";

impl TestFixture {
    pub async fn new() -> Self {
        Self::with_office_config(OfficeConfig::default()).await
    }

    pub async fn with_office_config(office: OfficeConfig) -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let storage_dir = temp_dir.path().join("upload");
        tokio::fs::create_dir_all(&storage_dir).await.unwrap();
        let db_path = temp_dir.path().join("test.db");

        let mut config = Config::default();
        config.storage.dir = storage_dir.clone();
        config.storage.cleanup_grace_secs = 0;
        config.database.path = db_path.clone();
        config.server.public_url = Some("http://localhost:8000".to_string());

        let audit_store: Arc<dyn AuditStore> =
            Arc::new(SqliteAuditStore::new(&db_path).expect("create audit store"));
        let (audit_handle, audit_writer) = create_audit_system(Arc::clone(&audit_store), 256);
        tokio::spawn(audit_writer.run());

        let (cleanup_handle, cleanup_worker) =
            create_cleanup_queue(Duration::from_millis(25), 64, Some(audit_handle.clone()));
        tokio::spawn(cleanup_worker.run());

        let selector = StrategySelector::new(Arc::new(MockRenderer::new()), office);
        let namer = Arc::new(ArtifactNamer::new(
            storage_dir.clone(),
            config.server.resolved_public_url(),
        ));
        let orchestrator = Arc::new(
            Orchestrator::new(selector, Arc::clone(&namer), cleanup_handle)
                .with_audit(audit_handle),
        );

        let state = Arc::new(AppState::new(config, orchestrator, namer, audit_store));
        let router = create_router(state);

        Self {
            router,
            storage_dir,
            _temp_dir: temp_dir,
        }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Posts a multipart conversion request with one file and a `to` field.
    pub async fn post_convert(
        &self,
        filename: &str,
        content_type: &str,
        bytes: &[u8],
        to: &str,
    ) -> TestResponse {
        let body = multipart_body(Some((filename, content_type, bytes)), Some(to));
        self.post_convert_raw(body).await
    }

    /// Posts a multipart request with no file field.
    pub async fn post_convert_without_file(&self, to: &str) -> TestResponse {
        let body = multipart_body(None, Some(to));
        self.post_convert_raw(body).await
    }

    async fn post_convert_raw(&self, body: Vec<u8>) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri("/convert")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router never errors");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("collect body")
            .to_bytes()
            .to_vec();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        TestResponse {
            status,
            body,
            bytes,
        }
    }

    /// Downloads a produced artifact through the static surface.
    pub async fn download(&self, download_link: &str) -> TestResponse {
        let filename = download_link.rsplit('/').next().unwrap();
        self.get(&format!("/download/{}", filename)).await
    }

    /// Names of files currently in the storage directory.
    pub fn storage_entries(&self) -> Vec<String> {
        storage_entries(&self.storage_dir)
    }
}

pub fn storage_entries(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .flatten()
                .map(|e| e.file_name().to_string_lossy().to_string())
                .collect()
        })
        .unwrap_or_default()
}

fn multipart_body(file: Option<(&str, &str, &[u8])>, to: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();

    if let Some((filename, content_type, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                MULTIPART_BOUNDARY, filename, content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    if let Some(to) = to {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"to\"\r\n\r\n{}\r\n",
                MULTIPART_BOUNDARY, to
            )
            .as_bytes(),
        );
    }

    body.extend_from_slice(format!("--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());
    body
}
