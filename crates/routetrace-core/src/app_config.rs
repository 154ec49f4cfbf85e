use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Runtime settings for the upload server, read from `ROUTETRACE_*` env vars.
#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub shops_path: PathBuf,
    /// Multi-rep track served by `/rep-ids` and `/process-rep`.
    pub shared_track_path: PathBuf,
    /// Google Maps key for the Roads and Directions APIs. When absent the
    /// server skips road snapping and measures straight-line distance.
    pub google_maps_api_key: Option<String>,
    pub accuracy_threshold_m: f64,
    pub min_move_distance_m: f64,
    pub max_snap_distance_m: f64,
    pub request_timeout_secs: u64,
    pub inter_request_delay_ms: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub max_upload_bytes: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("shops_path", &self.shops_path)
            .field("shared_track_path", &self.shared_track_path)
            .field(
                "google_maps_api_key",
                &self.google_maps_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("accuracy_threshold_m", &self.accuracy_threshold_m)
            .field("min_move_distance_m", &self.min_move_distance_m)
            .field("max_snap_distance_m", &self.max_snap_distance_m)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("inter_request_delay_ms", &self.inter_request_delay_ms)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}
