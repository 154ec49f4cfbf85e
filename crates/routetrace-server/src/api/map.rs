use axum::{extract::State, response::Html, Extension};

use super::{ApiError, AppState};
use crate::middleware::RequestId;

const UPLOAD_FORM: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>routetrace</title>
</head>
<body>
<h1>Upload GPS track</h1>
<form action="/upload/map" method="post" enctype="multipart/form-data">
<input type="file" name="file" accept=".csv,.xlsx" required>
<button type="submit">Upload</button>
</form>
</body>
</html>
"#;

pub(super) async fn upload_form() -> Html<&'static str> {
    Html(UPLOAD_FORM)
}

/// The page rendered by the most recent successful upload.
pub(super) async fn latest_map(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Html<String>, ApiError> {
    let session = state.map.lock().await;
    match session.canvas().to_html() {
        Ok(Some(html)) => Ok(Html(html)),
        Ok(None) => Err(ApiError::new(
            req_id.0,
            "not_found",
            "no map has been rendered yet",
        )),
        Err(e) => {
            tracing::error!(error = %e, "failed to serialise map document");
            Err(ApiError::new(req_id.0, "internal_error", "failed to render map"))
        }
    }
}
