use std::path::Path;

use routetrace_client::{UploadOutcome, Uploader};
use routetrace_map::{LeafletDocument, MapSession};

use crate::render::write_page;

/// Uploads `file` and writes the rendered map to `out`.
///
/// A missing selection prints the notice to stderr. Transport failures have
/// already been logged by the uploader and produce no output file.
///
/// # Errors
///
/// Returns an error for unreadable input, a response of the wrong shape, or a
/// failure writing `out`.
pub(crate) async fn run_upload(
    file: Option<&Path>,
    server: &str,
    out: &Path,
    timeout_secs: u64,
) -> anyhow::Result<()> {
    let uploader = Uploader::new(server, timeout_secs)?;
    let mut session = MapSession::new(LeafletDocument::new());

    match uploader.upload_and_render(file, &mut session).await? {
        UploadOutcome::Rendered(summary) => {
            write_page(&session, out)?;
            tracing::info!(
                markers = summary.markers,
                route_points = summary.route_points,
                out = %out.display(),
                "map written"
            );
            println!("{}", out.display());
        }
        UploadOutcome::NoFileSelected => {
            eprintln!("{}", routetrace_client::UploadError::NoFileSelected);
        }
        UploadOutcome::TransportFailed => {}
    }

    Ok(())
}
