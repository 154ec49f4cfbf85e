//! Client for the Google Roads (snap-to-roads) and Directions APIs.

pub mod client;
pub mod error;
pub mod polyline;
pub(crate) mod retry;
pub mod types;

pub use client::{RoadRoute, RoadsClient};
pub use error::RoadsError;
pub use polyline::decode_polyline;
