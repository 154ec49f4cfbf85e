use std::path::PathBuf;

use routetrace_core::{AppConfig, Environment};

/// Default settings with no Google key, so the pipeline stays offline.
pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        env: Environment::Test,
        bind_addr: ([127, 0, 0, 1], 0).into(),
        log_level: "debug".to_string(),
        shops_path: PathBuf::from("./config/shops.yaml"),
        shared_track_path: PathBuf::from("./data/Gps-Collection.csv"),
        google_maps_api_key: None,
        accuracy_threshold_m: 20.0,
        min_move_distance_m: 10.0,
        max_snap_distance_m: 15.0,
        request_timeout_secs: 5,
        inter_request_delay_ms: 0,
        max_retries: 0,
        retry_backoff_base_ms: 1,
        max_upload_bytes: 1024 * 1024,
    }
}
