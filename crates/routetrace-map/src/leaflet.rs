//! A [`MapCanvas`] that produces a standalone Leaflet page.

use quick_xml::escape::escape;
use routetrace_core::LatLng;
use serde::Serialize;

use crate::canvas::{MapCanvas, PolylineStyle, TileLayer, Viewport};
use crate::popup::Popup;

const LEAFLET_VERSION: &str = "1.9.4";

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Route map</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@__LEAFLET__/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@__LEAFLET__/dist/leaflet.js"></script>
<style>html, body, #__CONTAINER__ { height: 100%; margin: 0; }</style>
</head>
<body>
<div id="__CONTAINER__"></div>
<script>
const doc = __DOCUMENT__;
const map = L.map(doc.viewport.container).setView(doc.viewport.center, doc.viewport.zoom);
for (const t of doc.tile_layers) {
  L.tileLayer(t.url_template, { maxZoom: t.max_zoom, attribution: t.attribution }).addTo(map);
}
for (const m of doc.markers) {
  L.marker(m.position).addTo(map).bindPopup(m.popup_html);
}
for (const p of doc.polylines) {
  L.polyline(p.path, { color: p.style.color }).addTo(map);
}
</script>
</body>
</html>
"#;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerLayer {
    pub position: LatLng,
    /// Already escaped.
    pub popup_html: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolylineLayer {
    pub path: Vec<LatLng>,
    pub style: PolylineStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct MapState {
    viewport: Viewport,
    tile_layers: Vec<TileLayer>,
    markers: Vec<MarkerLayer>,
    polylines: Vec<PolylineLayer>,
}

/// Collects canvas calls and renders them as HTML.
///
/// Layers added before `init` are ignored, matching a map library that has no
/// map object to attach them to yet.
#[derive(Debug, Clone, Default)]
pub struct LeafletDocument {
    state: Option<MapState>,
}

impl LeafletDocument {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    #[must_use]
    pub fn viewport(&self) -> Option<&Viewport> {
        self.state.as_ref().map(|s| &s.viewport)
    }

    #[must_use]
    pub fn markers(&self) -> &[MarkerLayer] {
        self.state.as_ref().map_or(&[], |s| s.markers.as_slice())
    }

    #[must_use]
    pub fn polylines(&self) -> &[PolylineLayer] {
        self.state.as_ref().map_or(&[], |s| s.polylines.as_slice())
    }

    /// Renders the page, or `None` when no map has been initialised.
    ///
    /// # Errors
    ///
    /// Returns an error if the map state cannot be serialised to JSON.
    pub fn to_html(&self) -> Result<Option<String>, serde_json::Error> {
        let Some(state) = &self.state else {
            return Ok(None);
        };
        // `<` only occurs inside JSON strings, where `\u003c` is equivalent
        // and cannot close the surrounding script element.
        let json = serde_json::to_string(state)?.replace('<', "\\u003c");
        let container = escape(state.viewport.container.as_str());
        let page = PAGE_TEMPLATE
            .replace("__LEAFLET__", LEAFLET_VERSION)
            .replace("__CONTAINER__", &container)
            .replace("__DOCUMENT__", &json);
        Ok(Some(page))
    }
}

impl MapCanvas for LeafletDocument {
    fn init(&mut self, viewport: &Viewport) {
        self.state = Some(MapState {
            viewport: viewport.clone(),
            tile_layers: Vec::new(),
            markers: Vec::new(),
            polylines: Vec::new(),
        });
    }

    fn add_tile_layer(&mut self, layer: &TileLayer) {
        if let Some(state) = &mut self.state {
            state.tile_layers.push(layer.clone());
        }
    }

    fn add_marker(&mut self, position: LatLng, popup: &Popup) {
        if let Some(state) = &mut self.state {
            state.markers.push(MarkerLayer {
                position,
                popup_html: popup.to_html(),
            });
        }
    }

    fn add_polyline(&mut self, path: &[LatLng], style: &PolylineStyle) {
        if let Some(state) = &mut self.state {
            state.polylines.push(PolylineLayer {
                path: path.to_vec(),
                style: style.clone(),
            });
        }
    }

    fn reset(&mut self) {
        self.state = None;
    }
}

#[cfg(test)]
mod tests {
    use routetrace_core::{UploadResponse, VisitRecord};

    use super::*;
    use crate::MapSession;

    fn rendered(response: &UploadResponse) -> LeafletDocument {
        let mut session = MapSession::new(LeafletDocument::new());
        session.render(response);
        session.into_canvas()
    }

    #[test]
    fn empty_document_renders_nothing() {
        let doc = LeafletDocument::new();
        assert!(!doc.is_initialized());
        assert!(doc.to_html().unwrap().is_none());
        assert!(doc.markers().is_empty());
    }

    #[test]
    fn layers_before_init_are_ignored() {
        let mut doc = LeafletDocument::new();
        doc.add_marker(LatLng::new(1.0, 2.0), &Popup::new("x"));
        doc.add_polyline(&[LatLng::new(1.0, 2.0)], &PolylineStyle::default());
        assert!(!doc.is_initialized());
        assert!(doc.polylines().is_empty());
    }

    #[test]
    fn page_embeds_viewport_tiles_markers_and_route() {
        let doc = rendered(&UploadResponse {
            visit_records: vec![VisitRecord {
                shop: "Cafe A".to_string(),
                check_in: LatLng::new(6.14, 80.10),
                check_out: LatLng::new(6.15, 80.11),
                duration_min: 30.0,
                check_in_at: None,
                check_out_at: None,
            }],
            route_coords: vec![LatLng::new(6.14, 80.10), LatLng::new(6.15, 80.11)],
            total_distance_km: Some(1.5),
        });
        let html = doc.to_html().unwrap().unwrap();

        assert!(html.contains(r#"<div id="map"></div>"#));
        assert!(html.contains(r#""center":[6.13852,80.10066]"#));
        assert!(html.contains(r#""zoom":13"#));
        assert!(html.contains("tile.openstreetmap.org/{z}/{x}/{y}.png"));
        assert!(html.contains(r#""max_zoom":19"#));
        assert!(html.contains(r#""path":[[6.14,80.1],[6.15,80.11]]"#));
        assert!(html.contains(r#""color":"blue""#));
        assert!(html.contains("Cafe A"));
        assert!(html.contains("30 min"));
        assert_eq!(doc.markers().len(), 1);
        assert_eq!(doc.polylines().len(), 1);
    }

    #[test]
    fn hostile_shop_name_cannot_break_out_of_script() {
        let doc = rendered(&UploadResponse {
            visit_records: vec![VisitRecord {
                shop: "</script><script>alert(1)</script>".to_string(),
                check_in: LatLng::new(6.14, 80.10),
                check_out: LatLng::new(6.15, 80.11),
                duration_min: 2.0,
                check_in_at: None,
                check_out_at: None,
            }],
            ..UploadResponse::default()
        });
        let html = doc.to_html().unwrap().unwrap();
        assert_eq!(html.matches("<script").count(), 2);
        assert_eq!(html.matches("</script>").count(), 2);
        assert!(html.contains("&lt;/script&gt;"));
    }

    #[test]
    fn reset_clears_previous_map() {
        let mut session = MapSession::new(LeafletDocument::new());
        session.render(&UploadResponse {
            route_coords: vec![LatLng::new(1.0, 1.0); 3],
            ..UploadResponse::default()
        });
        session.render(&UploadResponse::default());
        let doc = session.canvas();
        assert_eq!(doc.polylines().len(), 1);
        assert!(doc.polylines()[0].path.is_empty());
    }
}
