mod map;
mod reps;
mod upload;

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use routetrace_core::{AppConfig, Shop};
use routetrace_map::{LeafletDocument, MapSession};
use routetrace_roads::RoadsClient;
use routetrace_track::Track;
use serde::Serialize;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, RequestId, REQUEST_ID_HEADER};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub shops: Arc<Vec<Shop>>,
    /// `None` when no Google key is configured.
    pub roads: Option<Arc<RoadsClient>>,
    /// Latest server-side render, replaced by every successful upload.
    pub map: Arc<Mutex<MapSession<LeafletDocument>>>,
    /// Multi-rep track behind `/rep-ids` and `/process-rep`.
    pub shared_track: Arc<Track>,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, shops: Vec<Shop>, roads: Option<Arc<RoadsClient>>) -> Self {
        Self {
            config,
            shops: Arc::new(shops),
            roads,
            map: Arc::new(Mutex::new(MapSession::new(LeafletDocument::new()))),
            shared_track: Arc::new(Track::default()),
        }
    }

    #[must_use]
    pub fn with_shared_track(mut self, track: Track) -> Self {
        self.shared_track = Arc::new(track);
        self
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    road_api: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "payload_too_large" => StatusCode::PAYLOAD_TOO_LARGE,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(REQUEST_ID_HEADER)])
}

fn upload_router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload::upload_track))
        .route("/upload/map", post(upload::upload_track_map))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

pub fn build_app(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(map::upload_form))
        .route("/map", get(map::latest_map))
        .route("/rep-ids", get(reps::rep_ids))
        .route("/process-rep", post(reps::process_rep))
        .route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(upload_router(state.config.max_upload_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_id))
                .layer(TraceLayer::new_for_http())
                .layer(build_cors()),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    Json(ApiResponse {
        data: HealthData {
            status: "ok",
            road_api: if state.roads.is_some() {
                "configured"
            } else {
                "disabled"
            },
        },
        meta: ResponseMeta::new(req_id.0),
    })
}
