//! Google's encoded polyline format (precision 5), via the `polyline` crate.

use routetrace_core::LatLng;

use crate::error::RoadsError;

const PRECISION: u32 = 5;

/// Decode an encoded polyline into coordinates.
///
/// # Errors
///
/// Returns [`RoadsError::InvalidPolyline`] when the input is truncated or
/// contains characters outside the encoding alphabet.
pub fn decode_polyline(encoded: &str) -> Result<Vec<LatLng>, RoadsError> {
    let line = polyline::decode_polyline(encoded, PRECISION).map_err(|e| {
        RoadsError::InvalidPolyline {
            reason: e.to_string(),
        }
    })?;

    Ok(line.into_iter().map(|c| LatLng::new(c.y, c.x)).collect())
}
