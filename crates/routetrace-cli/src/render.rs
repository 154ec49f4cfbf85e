//! Offline rendering of a saved upload response.

use std::path::Path;

use anyhow::Context;
use routetrace_core::UploadResponse;
use routetrace_map::{LeafletDocument, MapSession};

/// Writes the rendered page for `session` to `out`. Returns `false` when no
/// map has been initialised.
pub(crate) fn write_page(session: &MapSession<LeafletDocument>, out: &Path) -> anyhow::Result<bool> {
    let Some(html) = session.canvas().to_html()? else {
        return Ok(false);
    };
    std::fs::write(out, html).with_context(|| format!("failed to write {}", out.display()))?;
    Ok(true)
}

pub(crate) fn run_render(response_path: &Path, out: &Path) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(response_path)
        .with_context(|| format!("failed to read {}", response_path.display()))?;
    let response: UploadResponse = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not an upload response", response_path.display()))?;

    let mut session = MapSession::new(LeafletDocument::new());
    let summary = session.render(&response);
    write_page(&session, out)?;

    tracing::info!(
        markers = summary.markers,
        route_points = summary.route_points,
        out = %out.display(),
        "map written"
    );
    println!("{}", out.display());
    Ok(())
}
