use thiserror::Error;

/// Why a single upload job failed
#[derive(Error, Debug)]
pub enum UploadError {
    #[error(transparent)]
    Package(#[from] webstore_core::Error),

    /// Upload state other than SUCCESS; holds the provider message or raw payload
    #[error("Upload rejected: {0}")]
    Rejected(String),

    #[error("Invalid upload response: {0}")]
    InvalidResponse(String),

    #[error("Upload request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Account '{account}' was not authorized: {reason}")]
    Unauthorized { account: String, reason: String },
}

pub type Result<T> = std::result::Result<T, UploadError>;
