// Error taxonomy shared by every layer of the client.
// Commands never exit the process themselves: they return one of these
// and `main` turns it into a message and an exit code.

use std::path::PathBuf;

use thiserror::Error;

/// Every failure the client can report.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid URL '{input}': {reason}")]
    InvalidUrl { input: String, reason: String },

    #[error("the data store at {} is locked by another process (run `sonarr unlock` if it crashed)", .0.display())]
    LockHeld(PathBuf),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} not found")]
    NotFound(String),

    #[error("the data store is closed")]
    StoreClosed,

    #[error("data store error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Built with `Error::transport`, which strips the request URL so the
    /// api key in its query never reaches a message or log.
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("sonarr responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn transport(err: reqwest::Error) -> Self {
        Self::Transport(err.without_url())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Process exit code reported for this error.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) | Self::InvalidUrl { .. } => 2,
            Self::LockHeld(_) => 3,
            Self::NotFound(_) => 4,
            _ => 1,
        }
    }
}
