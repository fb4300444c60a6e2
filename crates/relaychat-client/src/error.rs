use thiserror::Error;

/// Failures of one chat turn as seen by the client.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The relay answered with a non-OK status before streaming.
    #[error("Relay responded with {status}: {message}")]
    Status { status: u16, message: String },

    /// The relay stream broke after it started.
    #[error("Relay stream failed: {0}")]
    Transport(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;
