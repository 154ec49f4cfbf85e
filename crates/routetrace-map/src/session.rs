use routetrace_core::UploadResponse;
use tracing::debug;

use crate::canvas::{MapCanvas, PolylineStyle, TileLayer, Viewport};
use crate::popup::Popup;

/// Counts of what a render pass drew.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSummary {
    pub markers: usize,
    pub route_points: usize,
}

/// Owns a canvas and renders upload responses onto it.
///
/// At most one map is live per session: a second render resets the canvas
/// before initialising it again.
#[derive(Debug)]
pub struct MapSession<C> {
    canvas: C,
    viewport: Viewport,
    tiles: TileLayer,
    route_style: PolylineStyle,
    rendered: bool,
}

impl<C: MapCanvas> MapSession<C> {
    /// Session with the fixed viewport, OpenStreetMap tiles and a blue route.
    pub fn new(canvas: C) -> Self {
        Self {
            canvas,
            viewport: Viewport::default(),
            tiles: TileLayer::openstreetmap(),
            route_style: PolylineStyle::default(),
            rendered: false,
        }
    }

    pub fn render(&mut self, response: &UploadResponse) -> RenderSummary {
        if self.rendered {
            self.canvas.reset();
        }

        self.canvas.init(&self.viewport);
        self.canvas.add_tile_layer(&self.tiles);

        for record in &response.visit_records {
            self.canvas
                .add_marker(record.check_in, &Popup::for_visit(record));
        }

        // A single point or an empty route still gets drawn.
        self.canvas
            .add_polyline(&response.route_coords, &self.route_style);
        self.rendered = true;

        let summary = RenderSummary {
            markers: response.visit_records.len(),
            route_points: response.route_coords.len(),
        };
        debug!(
            markers = summary.markers,
            route_points = summary.route_points,
            "map rendered"
        );
        summary
    }

    /// Whether a map has been initialised on the canvas.
    pub fn is_rendered(&self) -> bool {
        self.rendered
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn into_canvas(self) -> C {
        self.canvas
    }
}
