// Upload and publish against the Chrome Web Store items API

pub mod batch;
pub mod client;
pub mod error;
pub mod response;

pub use batch::{AccountAuth, BatchReport, JobReport, JobSuccess, run_batch};
pub use client::{API_VERSION_HEADER, WebstoreClient};
pub use error::{Result, UploadError};
pub use response::PublishOutcome;
