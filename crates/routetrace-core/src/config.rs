use std::env::VarError;
use std::str::FromStr;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable holds a value that cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable holds a value that cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can feed a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let env = parse_environment(&or_default("ROUTETRACE_ENV", "development"))?;
    let bind_addr: SocketAddr = parse_var(&lookup, "ROUTETRACE_BIND_ADDR", "0.0.0.0:7097")?;
    let log_level = or_default("ROUTETRACE_LOG_LEVEL", "info");
    let shops_path = PathBuf::from(or_default("ROUTETRACE_SHOPS_PATH", "./config/shops.yaml"));
    let shared_track_path = PathBuf::from(or_default(
        "ROUTETRACE_SHARED_TRACK_PATH",
        "./data/Gps-Collection.csv",
    ));
    let google_maps_api_key = lookup("GOOGLE_MAPS_API_KEY")
        .ok()
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty());

    let accuracy_threshold_m = parse_distance(&lookup, "ROUTETRACE_ACCURACY_THRESHOLD_M", "20")?;
    let min_move_distance_m = parse_distance(&lookup, "ROUTETRACE_MIN_MOVE_DISTANCE_M", "10")?;
    let max_snap_distance_m = parse_distance(&lookup, "ROUTETRACE_MAX_SNAP_DISTANCE_M", "15")?;

    let request_timeout_secs = parse_var(&lookup, "ROUTETRACE_REQUEST_TIMEOUT_SECS", "30")?;
    let inter_request_delay_ms = parse_var(&lookup, "ROUTETRACE_INTER_REQUEST_DELAY_MS", "100")?;
    let max_retries = parse_var(&lookup, "ROUTETRACE_MAX_RETRIES", "3")?;
    let retry_backoff_base_ms = parse_var(&lookup, "ROUTETRACE_RETRY_BACKOFF_BASE_MS", "500")?;
    let max_upload_bytes = parse_var(&lookup, "ROUTETRACE_MAX_UPLOAD_BYTES", "10485760")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        shops_path,
        shared_track_path,
        google_maps_api_key,
        accuracy_threshold_m,
        min_move_distance_m,
        max_snap_distance_m,
        request_timeout_secs,
        inter_request_delay_ms,
        max_retries,
        retry_backoff_base_ms,
        max_upload_bytes,
    })
}

fn parse_var<T, F>(lookup: &F, var: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Result<String, VarError>,
{
    let raw = lookup(var).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

/// Like [`parse_var`] for metre distances, which must be finite and non-negative.
fn parse_distance<F>(lookup: &F, var: &str, default: &str) -> Result<f64, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    let value: f64 = parse_var(lookup, var, default)?;
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected a non-negative distance in metres, got {value}"),
        });
    }
    Ok(value)
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s.trim() {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "ROUTETRACE_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
