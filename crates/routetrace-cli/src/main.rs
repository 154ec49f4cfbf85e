mod render;
mod upload;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:7097";
const DEFAULT_OUT: &str = "route_map.html";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Parser)]
#[command(name = "routetrace")]
#[command(about = "Upload GPS tracks and render route maps")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Upload a track to the server and write the returned map
    Upload {
        /// CSV or .xlsx track with Latitude, Longitude, Accuracy and DateTime columns
        file: Option<PathBuf>,
        #[arg(long, env = "ROUTETRACE_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
        server: String,
        #[arg(long, default_value = DEFAULT_OUT)]
        out: PathBuf,
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,
    },
    /// Render a saved upload response without contacting the server
    Render {
        /// JSON body of a previous `POST /upload`
        response: PathBuf,
        #[arg(long, default_value = DEFAULT_OUT)]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let level = log_level(|key| std::env::var(key));
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level)),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Upload {
            file,
            server,
            out,
            timeout_secs,
        } => upload::run_upload(file.as_deref(), &server, &out, timeout_secs).await,
        Commands::Render { response, out } => render::run_render(&response, &out),
    }
}

/// Reads only `ROUTETRACE_LOG_LEVEL`; the rest of the server environment is
/// never parsed by the CLI.
fn log_level<F>(lookup: F) -> String
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    lookup("ROUTETRACE_LOG_LEVEL")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
}
