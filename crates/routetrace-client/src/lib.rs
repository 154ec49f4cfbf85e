//! Uploads a GPS track to a routetrace server and renders the response.

pub mod error;
pub mod uploader;

pub use error::UploadError;
pub use uploader::{UploadOutcome, Uploader, UPLOAD_PATH};
