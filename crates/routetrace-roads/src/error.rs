use thiserror::Error;

/// Errors returned by [`crate::RoadsClient`].
#[derive(Debug, Error)]
pub enum RoadsError {
    /// Network or TLS failure, or a 5xx from the API.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// An encoded route polyline ended mid-value or held bytes outside the alphabet.
    #[error("invalid encoded polyline: {reason}")]
    InvalidPolyline { reason: String },
}
