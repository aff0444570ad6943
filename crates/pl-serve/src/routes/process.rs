use crate::middleware::correlation::CorrelationId;
use crate::routes::error::{failure, map_error, ApiEnvelope};
use crate::upload::{sanitize_filename, TempUpload};
use crate::AppState;
use axum::body::Bytes;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Extension, Json, Router};
use pl_core::types::{LogFormat, ProcessGraph};
use pl_core::ProcessError;
use std::sync::Arc;
use tracing::Instrument;
use utoipa::ToSchema;

pub const FILE_FIELD: &str = "file";
pub const NO_FILE_PART: &str = "No file part in the request.";
pub const NO_SELECTED_FILE: &str = "No selected file.";
pub const TOO_LARGE: &str = "Uploaded file exceeds the maximum allowed size.";

/// Multipart form accepted by `POST /api/process`.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    /// A `.csv` or `.xes` event log.
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

struct Upload {
    filename: String,
    bytes: Bytes,
}

pub fn router(state: AppState) -> Router {
    let limit = state.max_upload_bytes;
    Router::new()
        .route("/process", post(process_log))
        .layer(DefaultBodyLimit::max(limit))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/process",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, body = ApiEnvelope),
        (status = 400, body = ApiEnvelope),
        (status = 413, body = ApiEnvelope),
        (status = 500, body = ApiEnvelope)
    )
)]
pub(crate) async fn process_log(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let span = tracing::info_span!("process_log", correlation_id = %correlation.0);
    handle(state, multipart).instrument(span).await
}

async fn handle(state: AppState, multipart: Result<Multipart, MultipartRejection>) -> Response {
    let upload = match read_upload(multipart).await {
        Ok(upload) => upload,
        Err(response) => return response,
    };
    tracing::info!(filename = %upload.filename, bytes = upload.bytes.len(), "received event log");

    let graph = match discover_upload(&state, upload).await {
        Ok(graph) => graph,
        Err(err) => {
            if err.is_validation() {
                tracing::warn!(error = %err, "rejected event log");
            } else {
                tracing::error!(error = %err, "event log analysis failed");
            }
            return map_error(&err).into_response();
        }
    };

    let result = state.analyzer.analyze(graph).await;
    tracing::info!("processing successful");
    (StatusCode::OK, Json(ApiEnvelope::ok(result))).into_response()
}

async fn read_upload(multipart: Result<Multipart, MultipartRejection>) -> Result<Upload, Response> {
    let mut multipart = multipart.map_err(|rejection| {
        tracing::warn!(error = %rejection, "request is not multipart");
        failure(StatusCode::BAD_REQUEST, NO_FILE_PART).into_response()
    })?;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(failure(StatusCode::BAD_REQUEST, NO_FILE_PART).into_response()),
            Err(err) => return Err(multipart_failure(&err)),
        };
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().trim().to_string();
        if filename.is_empty() {
            return Err(failure(StatusCode::BAD_REQUEST, NO_SELECTED_FILE).into_response());
        }
        if LogFormat::from_filename(&filename).is_none() {
            let message = format!(
                "File type not allowed. Allowed types: {}",
                LogFormat::allowed_list()
            );
            return Err(failure(StatusCode::BAD_REQUEST, message).into_response());
        }

        let bytes = field.bytes().await.map_err(|err| multipart_failure(&err))?;
        return Ok(Upload { filename, bytes });
    }
}

fn multipart_failure(err: &MultipartError) -> Response {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        tracing::warn!(error = %err, "upload exceeds body limit");
        return failure(StatusCode::PAYLOAD_TOO_LARGE, TOO_LARGE).into_response();
    }
    tracing::warn!(error = %err, "malformed multipart body");
    failure(StatusCode::BAD_REQUEST, NO_FILE_PART).into_response()
}

/// Stages the upload, then normalizes and mines it on the blocking pool. The
/// staged file is gone by the time this returns.
async fn discover_upload(state: &AppState, upload: Upload) -> Result<ProcessGraph, ProcessError> {
    let analyzer = Arc::clone(&state.analyzer);
    let upload_dir = state.upload_dir.clone();
    let span = tracing::Span::current();

    let task = tokio::task::spawn_blocking(move || {
        let _entered = span.enter();
        let sanitized = sanitize_filename(&upload.filename);
        let staged = TempUpload::persist(&upload_dir, &sanitized, &upload.bytes).map_err(|err| {
            ProcessError::Internal {
                message: format!("failed to stage upload in {}: {err}", upload_dir.display()),
            }
        })?;
        tracing::debug!(path = %staged.path().display(), "staged upload");

        let result = analyzer.discover_file(staged.path(), &upload.filename);
        staged.cleanup();
        result
    });

    task.await.map_err(|err| ProcessError::Internal {
        message: format!("analysis task failed: {err}"),
    })?
}
