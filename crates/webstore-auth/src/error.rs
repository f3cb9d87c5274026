use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The token endpoint answered with an `error` field; holds the raw payload
    #[error("Token endpoint returned an error: {0}")]
    Provider(String),

    #[error("Authorization denied: {0}")]
    Denied(String),

    #[error("Invalid token response: {0}")]
    InvalidResponse(String),

    #[error("No authorization code entered")]
    NoCode,

    #[error("Account '{0}' has no refresh token")]
    NoRefreshToken(String),

    #[error("Token request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Callback listener error: {0}")]
    Listener(String),

    #[error("Timed out after {0:?} waiting for authorization")]
    Timeout(Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
