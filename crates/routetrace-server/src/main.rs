mod api;
mod middleware;
mod pipeline;
#[cfg(test)]
mod test_support;

use std::sync::Arc;

use anyhow::Context;
use routetrace_roads::RoadsClient;
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(routetrace_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let shops = routetrace_core::load_shops_or_default(&config.shops_path)
        .with_context(|| format!("failed to load shops from {}", config.shops_path.display()))?;
    tracing::info!(shops = shops.len(), path = %config.shops_path.display(), "shop list loaded");

    let roads = match config.google_maps_api_key.as_deref() {
        Some(key) => Some(Arc::new(
            RoadsClient::new(key, config.request_timeout_secs)?
                .with_retry(config.max_retries, config.retry_backoff_base_ms)
                .with_inter_request_delay(config.inter_request_delay_ms),
        )),
        None => {
            tracing::warn!(
                "GOOGLE_MAPS_API_KEY not set; routes will be straight lines between filtered fixes"
            );
            None
        }
    };

    let shared_track = pipeline::load_shared_track(&config.shared_track_path);

    let state = AppState::new(Arc::clone(&config), shops, roads).with_shared_track(shared_track);
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "routetrace server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
