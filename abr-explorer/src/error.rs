//! Ladder exploration error types.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExplorerError {
    /// Generation and expansion left nothing to analyze.
    #[error("no pairs to analyze")]
    NoPairs,

    #[error("Invalid configuration: {message}")]
    Config { message: String },

    #[error("Invalid resolution `{input}`: {message}")]
    InvalidResolution { input: String, message: String },

    #[error("Transcode failed for {output}: {message}")]
    Transcode { output: PathBuf, message: String },

    #[error("Quality analysis failed for {quality_file}: {message}")]
    Analysis {
        quality_file: PathBuf,
        message: String,
    },

    #[error("`{program}` exited with {status}")]
    Command { program: String, status: String },

    #[error("Candidate task failed: {0}")]
    Join(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for ExplorerError {
    fn from(e: serde_json::Error) -> Self {
        ExplorerError::Serialization(e.to_string())
    }
}

impl From<tokio::task::JoinError> for ExplorerError {
    fn from(e: tokio::task::JoinError) -> Self {
        ExplorerError::Join(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ExplorerError>;
