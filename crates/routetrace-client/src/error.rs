use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    /// Nothing to upload. The message is shown to the user as-is.
    #[error("Please select a file to upload.")]
    NoFileSelected,

    /// The selected file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The request did not complete (connect, timeout, body read).
    #[error("upload request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body is not JSON.
    #[error("upload response is not JSON: {0}")]
    Parse(#[source] serde_json::Error),

    /// The response is JSON but not an upload response.
    #[error("upload response has unexpected shape: {0}")]
    Schema(#[source] serde_json::Error),

    #[error("invalid server URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
