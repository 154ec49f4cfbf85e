use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A WGS84 coordinate, serialised as a `[latitude, longitude]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether both components are finite and inside the WGS84 ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl From<[f64; 2]> for LatLng {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<LatLng> for [f64; 2] {
    fn from(p: LatLng) -> Self {
        [p.lat, p.lng]
    }
}

impl From<(f64, f64)> for LatLng {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self { lat, lng }
    }
}

/// Formats as `lat,lng`, the form used in query strings and popups.
impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// One raw GPS fix from an uploaded track.
#[derive(Debug, Clone, PartialEq)]
pub struct GpsFix {
    pub position: LatLng,
    pub accuracy_m: f64,
    pub recorded_at: NaiveDateTime,
    /// `RepId` cell of the row, when the track carries several reps.
    pub rep_id: Option<String>,
}

/// A sales rep named in a shared track.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rep {
    pub id: String,
    pub name: String,
}

/// One stay inside a shop's radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitRecord {
    pub shop: String,
    pub check_in: LatLng,
    pub check_out: LatLng,
    pub duration_min: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_in_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out_at: Option<NaiveDateTime>,
}

/// Body of a successful `POST /upload`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub visit_records: Vec<VisitRecord>,
    pub route_coords: Vec<LatLng>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_distance_km: Option<f64>,
}
