//! Route map rendering.
//!
//! [`MapSession`] drives any [`MapCanvas`] through one render pass of an
//! [`routetrace_core::UploadResponse`]; [`LeafletDocument`] is the canvas that
//! produces a standalone Leaflet HTML page.

pub mod canvas;
pub mod leaflet;
pub mod popup;
pub mod session;

pub use canvas::{MapCanvas, PolylineStyle, TileLayer, Viewport, DEFAULT_CENTER, DEFAULT_ZOOM};
pub use leaflet::{LeafletDocument, MarkerLayer, PolylineLayer};
pub use popup::Popup;
pub use session::{MapSession, RenderSummary};
