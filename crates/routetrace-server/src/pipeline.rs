//! Turns an uploaded track, or one rep's slice of the shared track, into an
//! [`UploadResponse`].
//!
//! parse -> accuracy filter -> distance filter -> snap to roads -> directions
//! -> visit detection. Without a roads client the distance-filtered fixes are
//! used as the route and the distance is measured along them.

use std::path::Path;

use routetrace_core::{AppConfig, GpsFix, LatLng, Shop, UploadResponse};
use routetrace_roads::{RoadsClient, RoadsError};
use routetrace_track::{
    detect_shop_visits, filter_by_accuracy, filter_by_distance, filter_by_rep, parse_track,
    path_length_m, Track, TrackError, TrackFormat, VisitRules,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Track(#[from] TrackError),

    #[error(transparent)]
    Roads(#[from] RoadsError),

    /// Nothing of the selected rep survived the accuracy filter.
    #[error("No valid data found for selected Rep ID")]
    NoRepData,
}

/// Distance and geometry of the reconstructed route.
struct Route {
    distance_km: f64,
    coords: Vec<LatLng>,
}

pub async fn process_upload(
    bytes: &[u8],
    format: TrackFormat,
    config: &AppConfig,
    shops: &[Shop],
    roads: Option<&RoadsClient>,
) -> Result<UploadResponse, PipelineError> {
    let track = parse_track(bytes, format)?;
    let raw_count = track.fixes.len();
    let fixes = filter_by_accuracy(track.fixes, config.accuracy_threshold_m);
    tracing::debug!(raw = raw_count, accurate = fixes.len(), ?format, "upload parsed");

    build_response(&fixes, config, shops, roads).await
}

/// Process the fixes of one rep from the shared track.
pub async fn process_rep(
    track: &Track,
    rep_id: &str,
    config: &AppConfig,
    shops: &[Shop],
    roads: Option<&RoadsClient>,
) -> Result<UploadResponse, PipelineError> {
    let rep_fixes = filter_by_rep(&track.fixes, rep_id);
    let fixes = filter_by_accuracy(rep_fixes, config.accuracy_threshold_m);
    if fixes.is_empty() {
        return Err(PipelineError::NoRepData);
    }
    tracing::debug!(rep_id, accurate = fixes.len(), "rep track selected");

    build_response(&fixes, config, shops, roads).await
}

/// Read the shared multi-rep track. A missing or unreadable file leaves the
/// rep endpoints with an empty roster.
pub fn load_shared_track(path: &Path) -> Track {
    let format = TrackFormat::from_file_name(&path.to_string_lossy());
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "shared track not loaded");
            return Track::default();
        }
    };
    match parse_track(&bytes, format) {
        Ok(track) => {
            tracing::info!(
                path = %path.display(),
                fixes = track.fixes.len(),
                reps = track.reps.len(),
                "shared track loaded"
            );
            track
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "shared track could not be parsed");
            Track::default()
        }
    }
}

async fn build_response(
    fixes: &[GpsFix],
    config: &AppConfig,
    shops: &[Shop],
    roads: Option<&RoadsClient>,
) -> Result<UploadResponse, PipelineError> {
    let positions: Vec<LatLng> = fixes.iter().map(|f| f.position).collect();
    let moved = filter_by_distance(&positions, config.min_move_distance_m);

    let route = match roads {
        Some(client) => road_route(client, &moved, config.max_snap_distance_m).await?,
        None => Route {
            distance_km: path_length_m(&moved) / 1000.0,
            coords: moved.clone(),
        },
    };

    let visit_records = detect_shop_visits(fixes, shops, VisitRules::default());

    tracing::info!(
        accurate = fixes.len(),
        moved = moved.len(),
        route_points = route.coords.len(),
        visits = visit_records.len(),
        distance_km = route.distance_km,
        "track processed"
    );

    Ok(UploadResponse {
        visit_records,
        route_coords: route.coords,
        total_distance_km: Some(round3(route.distance_km)),
    })
}

async fn road_route(
    client: &RoadsClient,
    points: &[LatLng],
    max_snap_distance_m: f64,
) -> Result<Route, RoadsError> {
    let snapped = client.snap_to_roads(points, max_snap_distance_m).await?;
    let road = client.road_route(&snapped).await?;

    // Every directions segment was rejected: fall back to the snapped path.
    let coords = if road.coords.is_empty() {
        snapped
    } else {
        road.coords
    };
    Ok(Route {
        distance_km: road.distance_km,
        coords,
    })
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
