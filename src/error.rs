// src/error.rs
use std::io;
use thiserror::Error;

use crate::fetch::FetchError;
use crate::parser::ParseError;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, AgentError>;

/// Custom Error type for the exporter
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Metric error: {0}")]
    Metric(String),

    #[error("Server error: {0}")]
    Server(String),
}

impl From<prometheus::Error> for AgentError {
    fn from(err: prometheus::Error) -> Self {
        AgentError::Metric(err.to_string())
    }
}
