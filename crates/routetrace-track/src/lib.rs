//! GPS track processing: CSV and Excel ingestion, noise filtering and shop-visit detection.
//!
//! Everything here is pure and synchronous; network-bound steps (road
//! snapping, directions) live in `routetrace-roads`.

pub mod distance;
pub mod error;
pub mod filter;
pub mod ingest;
pub mod visits;

pub use distance::{haversine_m, path_length_m};
pub use error::TrackError;
pub use filter::{filter_by_accuracy, filter_by_distance, filter_by_rep};
pub use ingest::{
    parse_timestamp, parse_track, parse_track_csv, parse_track_xlsx, Track, TrackFormat,
    REQUIRED_COLUMNS,
};
pub use visits::{detect_shop_visits, merge_close_visits, VisitRules};
