//! Error types shared by the client, the Slack transport and the encoders.

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing credential or a channel that cannot be resolved.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Slack answered but reported `ok: false`.
    #[error("Slack API error in {method}: {error}")]
    RemoteApi { method: String, error: String },

    /// The request never produced a usable response.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Image encoding failed: {0}")]
    Encoding(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub(crate) fn remote(method: &str, error: impl Into<String>) -> Self {
        Self::RemoteApi {
            method: method.to_string(),
            error: error.into(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Self::Encoding(err.to_string())
    }
}
