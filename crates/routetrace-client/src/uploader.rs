use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use routetrace_core::UploadResponse;
use routetrace_map::{MapCanvas, MapSession, RenderSummary};
use tracing::{error, info};

use crate::error::UploadError;

/// Endpoint path, relative to the server base URL.
pub const UPLOAD_PATH: &str = "upload";
/// Multipart field the server reads the track from.
const FILE_FIELD: &str = "file";

/// Which branch an upload-and-render took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Rendered(RenderSummary),
    /// The user has been told to pick a file; nothing was sent.
    NoFileSelected,
    /// The request or response decoding failed and was logged.
    TransportFailed,
}

/// Posts a single track file to `<base>/upload`.
#[derive(Debug, Clone)]
pub struct Uploader {
    client: Client,
    endpoint: Url,
}

impl Uploader {
    /// # Errors
    ///
    /// Returns [`UploadError::InvalidBaseUrl`] if `base_url` does not parse,
    /// or [`UploadError::Transport`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, UploadError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent("routetrace/0.1 (uploader)")
            .build()?;

        let mut normalized = base_url.trim_end_matches('/').to_owned();
        normalized.push('/');
        let endpoint = Url::parse(&normalized)
            .and_then(|base| base.join(UPLOAD_PATH))
            .map_err(|e| UploadError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: e.to_string(),
            })?;

        Ok(Self { client, endpoint })
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Uploads the selected file and decodes the server's reply.
    ///
    /// The HTTP status is not inspected: whatever body arrives is decoded.
    ///
    /// # Errors
    ///
    /// - [`UploadError::NoFileSelected`] when `selection` is `None`; no
    ///   request is made.
    /// - [`UploadError::Io`] if the file cannot be read.
    /// - [`UploadError::Transport`] / [`UploadError::Parse`] when the round
    ///   trip fails or the body is not JSON.
    /// - [`UploadError::Schema`] when the JSON is not an upload response.
    pub async fn upload(&self, selection: Option<&Path>) -> Result<UploadResponse, UploadError> {
        let path = selection.ok_or(UploadError::NoFileSelected)?;

        let bytes = tokio::fs::read(path).await.map_err(|source| UploadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map_or_else(|| "upload".to_owned(), |n| n.to_string_lossy().into_owned());

        info!(file = %file_name, bytes = bytes.len(), endpoint = %self.endpoint, "uploading track");

        let form = Form::new().part(FILE_FIELD, Part::bytes(bytes).file_name(file_name));
        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await?;
        let body = response.text().await?;

        let value: serde_json::Value = serde_json::from_str(&body).map_err(UploadError::Parse)?;
        serde_json::from_value(value).map_err(UploadError::Schema)
    }

    /// Uploads then renders onto `session`.
    ///
    /// Transport and parse failures are logged and reported as
    /// [`UploadOutcome::TransportFailed`]; the session is left untouched.
    ///
    /// # Errors
    ///
    /// Propagates [`UploadError::Schema`] and [`UploadError::Io`].
    pub async fn upload_and_render<C: MapCanvas>(
        &self,
        selection: Option<&Path>,
        session: &mut MapSession<C>,
    ) -> Result<UploadOutcome, UploadError> {
        match self.upload(selection).await {
            Ok(response) => Ok(UploadOutcome::Rendered(session.render(&response))),
            Err(UploadError::NoFileSelected) => Ok(UploadOutcome::NoFileSelected),
            Err(e @ (UploadError::Transport(_) | UploadError::Parse(_))) => {
                error!(error = %e, "upload failed");
                Ok(UploadOutcome::TransportFailed)
            }
            Err(e) => Err(e),
        }
    }
}
