use std::io;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

/// Result type for fetch operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Errors that can occur while retrieving a raw payload
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to spawn command: {0}")]
    Spawn(io::Error),

    #[error("Command execution failed: {status}, output: {output}")]
    NonZeroExit { status: ExitStatus, output: String },

    #[error("Command timed out after {after:?}, output: {output}")]
    Timeout { after: Duration, output: String },

    #[error("Failed to read command output: {0}")]
    ReadError(io::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to read file: {0}")]
    Io(#[from] io::Error),
}
