use routetrace_core::LatLng;
use serde::Serialize;

use crate::popup::Popup;

/// DOM id of the element the map is bound to.
pub const DEFAULT_CONTAINER: &str = "map";
/// Fixed initial view; not derived from the rendered data.
pub const DEFAULT_CENTER: LatLng = LatLng::new(6.138_52, 80.100_66);
pub const DEFAULT_ZOOM: u8 = 13;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Viewport {
    pub container: String,
    pub center: LatLng,
    pub zoom: u8,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            container: DEFAULT_CONTAINER.to_string(),
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
        }
    }
}

/// A raster base layer served by a tile provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileLayer {
    pub url_template: String,
    pub max_zoom: u8,
    /// Trusted markup shown in the map corner.
    pub attribution: String,
}

impl TileLayer {
    /// The public OpenStreetMap tile servers.
    #[must_use]
    pub fn openstreetmap() -> Self {
        Self {
            url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            max_zoom: 19,
            attribution: "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors"
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolylineStyle {
    pub color: String,
}

impl Default for PolylineStyle {
    fn default() -> Self {
        Self {
            color: "blue".to_string(),
        }
    }
}

/// The operations a map backend must support.
///
/// Calls arrive in render order: `init`, then layers, markers and polylines.
/// `reset` discards everything so the next `init` starts from a blank map.
pub trait MapCanvas {
    fn init(&mut self, viewport: &Viewport);
    fn add_tile_layer(&mut self, layer: &TileLayer);
    fn add_marker(&mut self, position: LatLng, popup: &Popup);
    fn add_polyline(&mut self, path: &[LatLng], style: &PolylineStyle);
    fn reset(&mut self);
}
