use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    response::Html,
    Extension, Json,
};
use routetrace_core::UploadResponse;
use routetrace_track::{TrackError, TrackFormat};

use super::{ApiError, AppState};
use crate::middleware::RequestId;
use crate::pipeline::{self, PipelineError};

/// Multipart field carrying the track file.
const FILE_FIELD: &str = "file";

/// `POST /upload`: process the track and return the response JSON.
pub(super) async fn upload_track(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let response = process_upload(&state, &req_id.0, multipart).await?;
    state.map.lock().await.render(&response);
    Ok(Json(response))
}

/// `POST /upload/map`: process the track and return the rendered page.
pub(super) async fn upload_track_map(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Html<String>, ApiError> {
    let response = process_upload(&state, &req_id.0, multipart).await?;

    let mut session = state.map.lock().await;
    session.render(&response);
    match session.canvas().to_html() {
        Ok(Some(html)) => Ok(Html(html)),
        Ok(None) => Err(ApiError::new(req_id.0, "internal_error", "map was not rendered")),
        Err(e) => {
            tracing::error!(error = %e, "failed to serialise map document");
            Err(ApiError::new(req_id.0, "internal_error", "failed to render map"))
        }
    }
}

async fn process_upload(
    state: &AppState,
    req_id: &str,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<UploadResponse, ApiError> {
    let mut multipart = multipart.map_err(|e| {
        ApiError::new(req_id, "bad_request", format!("expected a multipart upload: {e}"))
    })?;
    let (file_name, bytes) = read_track_file(&mut multipart, req_id).await?;

    pipeline::process_upload(
        &bytes,
        TrackFormat::from_file_name(&file_name),
        &state.config,
        &state.shops,
        state.roads.as_deref(),
    )
    .await
    .map_err(|e| map_pipeline_error(req_id, &e))
}

/// Returns the file name and bytes of the first `file` part. Other parts are
/// skipped.
async fn read_track_file(
    multipart: &mut Multipart,
    req_id: &str,
) -> Result<(String, Bytes), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| map_multipart_error(req_id, &e))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        if field.file_name().is_none_or(str::is_empty) {
            return Err(ApiError::new(req_id, "bad_request", "No selected file"));
        }
        let file_name = field.file_name().unwrap_or_default().to_owned();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| map_multipart_error(req_id, &e))?;
        tracing::info!(file = %file_name, bytes = bytes.len(), "track received");
        return Ok((file_name, bytes));
    }

    Err(ApiError::new(
        req_id,
        "bad_request",
        "No file part in the request",
    ))
}

fn map_multipart_error(req_id: &str, error: &MultipartError) -> ApiError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::new(req_id, "payload_too_large", "uploaded file is too large");
    }
    ApiError::new(req_id, "bad_request", error.body_text())
}

pub(super) fn map_pipeline_error(req_id: &str, error: &PipelineError) -> ApiError {
    match error {
        PipelineError::Track(e @ TrackError::MissingColumns(_)) => {
            ApiError::new(req_id, "validation_error", e.to_string())
        }
        PipelineError::Track(
            e @ (TrackError::Csv(_) | TrackError::Xlsx(_) | TrackError::EmptyWorkbook),
        ) => ApiError::new(req_id, "bad_request", format!("could not read the track: {e}")),
        PipelineError::NoRepData => ApiError::new(req_id, "bad_request", error.to_string()),
        PipelineError::Roads(e) => {
            tracing::error!(error = %e, "road API request failed");
            ApiError::new(req_id, "upstream_error", "road API request failed")
        }
    }
}

#[cfg(test)]
#[path = "upload_test.rs"]
mod tests;
