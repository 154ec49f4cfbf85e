use geo::{Distance, Haversine, Point};
use routetrace_core::LatLng;

/// Great-circle distance in metres between two coordinates.
#[must_use]
pub fn haversine_m(a: LatLng, b: LatLng) -> f64 {
    // geo points are (x = lng, y = lat)
    Haversine::distance(Point::new(a.lng, a.lat), Point::new(b.lng, b.lat))
}

/// Sum of leg distances along `path`, in metres.
#[must_use]
pub fn path_length_m(path: &[LatLng]) -> f64 {
    path.windows(2).map(|w| haversine_m(w[0], w[1])).sum()
}
