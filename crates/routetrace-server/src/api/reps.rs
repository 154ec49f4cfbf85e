use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use routetrace_core::{Rep, UploadResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{upload::map_pipeline_error, ApiError, AppState};
use crate::middleware::RequestId;
use crate::pipeline;

#[derive(Debug, Serialize)]
pub(super) struct RepIdsResponse {
    rep_ids: Vec<Rep>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ProcessRepRequest {
    /// Spreadsheet exports carry numeric ids as well as strings.
    #[serde(default)]
    rep_id: Option<Value>,
}

#[derive(Debug, Serialize)]
pub(super) struct ProcessRepResponse {
    #[serde(flatten)]
    response: UploadResponse,
    map_url: &'static str,
}

/// `GET /rep-ids`: the reps named in the shared track.
pub(super) async fn rep_ids(State(state): State<AppState>) -> Json<RepIdsResponse> {
    Json(RepIdsResponse {
        rep_ids: state.shared_track.reps.clone(),
    })
}

/// `POST /process-rep`: process one rep's fixes and render them as the
/// latest map.
pub(super) async fn process_rep(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<ProcessRepRequest>, JsonRejection>,
) -> Result<Json<ProcessRepResponse>, ApiError> {
    let Json(request) = body.map_err(|e| {
        ApiError::new(&req_id.0, "bad_request", format!("expected a JSON body: {}", e.body_text()))
    })?;
    let rep_id = request
        .rep_id
        .as_ref()
        .and_then(rep_id_text)
        .ok_or_else(|| ApiError::new(&req_id.0, "bad_request", "Missing rep_id in request"))?;

    let response = pipeline::process_rep(
        &state.shared_track,
        &rep_id,
        &state.config,
        &state.shops,
        state.roads.as_deref(),
    )
    .await
    .map_err(|e| map_pipeline_error(&req_id.0, &e))?;

    state.map.lock().await.render(&response);
    Ok(Json(ProcessRepResponse {
        response,
        map_url: "/map",
    }))
}

fn rep_id_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn rep_id_accepts_strings_and_numbers() {
        assert_eq!(rep_id_text(&json!(" R1 ")), Some("R1".to_string()));
        assert_eq!(rep_id_text(&json!(101)), Some("101".to_string()));
        assert_eq!(rep_id_text(&json!("  ")), None);
        assert_eq!(rep_id_text(&Value::Null), None);
        assert_eq!(rep_id_text(&json!(["R1"])), None);
    }
}
