use crate::pipeline::PipelineError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read store file {}: {source}", .path.display())]
    StoreRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to parse incident payload: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP status error: received {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error("Content type is not application/json, received {0}")]
    ContentType(String),

    #[error("Content length mismatch: expected {expected}, received {actual}")]
    ContentLength { expected: u64, actual: u64 },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

impl Error {
    /// Process exit code for this error: 2 for misconfiguration, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_)
            | Error::Toml(_)
            | Error::Pipeline(PipelineError::InvalidConfiguration { .. }) => 2,
            Error::Pipeline(PipelineError::Cancelled) => 130,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
