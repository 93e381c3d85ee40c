//! The conversion entry point.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use morpho_core::ConversionRequest;

use crate::metrics;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    pub message: String,
    #[serde(rename = "downloadLink")]
    pub download_link: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ErrorReply = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: &str) -> ErrorReply {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

fn conversion_failed() -> ErrorReply {
    // Diagnostic detail is collapsed for the caller by design; the full
    // cause lives in logs and the audit trail.
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Conversion failed".to_string(),
        }),
    )
}

struct UploadedFile {
    original_filename: String,
    media_type: String,
    bytes: Vec<u8>,
}

/// POST /convert
///
/// Multipart with one file field (`file` or the legacy `image` name) and a
/// `to` field naming the target format. Returns the public download link on
/// success.
pub async fn convert(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ConvertResponse>, ErrorReply> {
    let started = Instant::now();

    let mut file: Option<UploadedFile> = None;
    let mut target: Option<String> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!("Malformed multipart body: {}", e);
                return Err(bad_request("Malformed multipart body"));
            }
        };

        match field.name() {
            Some("file") | Some("image") => {
                let original_filename = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| "upload".to_string());
                let media_type = field
                    .content_type()
                    .map(str::to_string)
                    .unwrap_or_default();
                let bytes = field.bytes().await.map_err(|e| {
                    warn!("Failed to read upload: {}", e);
                    bad_request("Failed to read uploaded file")
                })?;
                file = Some(UploadedFile {
                    original_filename,
                    media_type,
                    bytes: bytes.to_vec(),
                });
            }
            Some("to") => {
                target = field.text().await.ok().map(|t| t.trim().to_string());
            }
            _ => {}
        }
    }

    let Some(file) = file else {
        metrics::CONVERSIONS_TOTAL
            .with_label_values(&["missing_input", "none"])
            .inc();
        return Err(bad_request("No file uploaded"));
    };
    let target = target.unwrap_or_default();

    let request_id = Uuid::new_v4().to_string();
    metrics::UPLOAD_BYTES_TOTAL.inc_by(file.bytes.len() as u64);

    // The upload handler owns input creation; the orchestrator owns the rest
    // of the artifact's life.
    let input_path = state
        .namer()
        .input_path(&request_id, &file.original_filename);
    if let Err(e) = tokio::fs::write(&input_path, &file.bytes).await {
        error!(request_id = %request_id, "Failed to store upload: {}", e);
        metrics::CONVERSIONS_TOTAL
            .with_label_values(&["storage_error", "none"])
            .inc();
        return Err(conversion_failed());
    }

    info!(
        request_id = %request_id,
        filename = %file.original_filename,
        media_type = %file.media_type,
        target = %target,
        size_bytes = file.bytes.len(),
        "Conversion requested"
    );

    let request = ConversionRequest::new(
        request_id,
        input_path,
        file.media_type,
        file.original_filename,
        target,
    );

    match state.orchestrator().convert(&request).await {
        Ok(artifact) => {
            metrics::CONVERSIONS_TOTAL
                .with_label_values(&["success", artifact.strategy])
                .inc();
            metrics::CONVERSION_DURATION
                .with_label_values(&["success"])
                .observe(started.elapsed().as_secs_f64());

            Ok(Json(ConvertResponse {
                message: "Conversion successful".to_string(),
                download_link: state.namer().download_link(&artifact.output_filename),
            }))
        }
        Err(e) => {
            metrics::CONVERSIONS_TOTAL
                .with_label_values(&[error_class(&e), "none"])
                .inc();
            metrics::CONVERSION_DURATION
                .with_label_values(&["failure"])
                .observe(started.elapsed().as_secs_f64());

            if e.is_client_error() {
                Err(bad_request("No file uploaded"))
            } else {
                Err(conversion_failed())
            }
        }
    }
}

/// Stable per-cause label for telemetry.
fn error_class(e: &morpho_core::ConversionError) -> &'static str {
    use morpho_core::ConversionError::*;
    match e {
        UnsupportedFormat { .. } => "unsupported_format",
        UnsupportedCodec { .. } => "unsupported_codec",
        UnsupportedEmbedSource { .. } => "unsupported_embed_source",
        MissingInput => "missing_input",
        BackendFailure { .. } => "backend_failure",
        ExternalProcessFailure { .. } => "external_process_failure",
        Timeout { .. } => "timeout",
        Io(_) => "io_error",
    }
}
