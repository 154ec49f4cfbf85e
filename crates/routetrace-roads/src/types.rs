//! Wire types for the Roads and Directions API responses.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SnapToRoadsResponse {
    #[serde(default, rename = "snappedPoints")]
    pub snapped_points: Option<Vec<SnappedPoint>>,
    #[serde(default)]
    pub error: Option<GoogleApiError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnappedPoint {
    pub location: SnappedLocation,
    /// Index into the request batch; absent for interpolated points.
    #[serde(default, rename = "originalIndex")]
    pub original_index: Option<usize>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SnappedLocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// Error envelope used by the Roads API.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleApiError {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirectionsResponse {
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirectionsRoute {
    #[serde(default)]
    pub legs: Vec<RouteLeg>,
    pub overview_polyline: EncodedPolyline,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouteLeg {
    pub distance: LegDistance,
}

/// Leg length; `value` is in metres.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LegDistance {
    pub value: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EncodedPolyline {
    pub points: String,
}
