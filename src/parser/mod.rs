//! Scalar extraction from raw payloads
//!
//! Each strategy narrows the payload down to a single string, which is then
//! converted to an `f64`. Only one value is ever extracted per payload.

mod json;
mod text;

use thiserror::Error;

use crate::config::ParserSpec;

pub use json::{extract_json_value, render_json};
pub use text::{extract_line, extract_regex, extract_split};

/// Result type for parse operations
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Errors raised while extracting a value
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("invalid regex pattern: {0}")]
    InvalidPattern(String),

    #[error("regex pattern did not match or capture group not found")]
    NoMatch,

    #[error("failed to parse JSON: {0}")]
    InvalidJson(String),

    #[error("JSON path not found: {0}")]
    PathNotFound(String),

    #[error("invalid array index: {0}")]
    InvalidIndex(String),

    #[error("array index out of range: {0}")]
    IndexOutOfRange(usize),

    #[error("cannot navigate JSON path at: {0}")]
    NotNavigable(String),

    #[error("line number {0} out of range")]
    LineOutOfRange(usize),

    #[error("split index {0} out of range")]
    SplitOutOfRange(usize),

    #[error("failed to parse value as a number: {0:?}")]
    NotANumber(String),
}

/// Extract a single number from `raw` using the given strategy
pub fn parse(raw: &str, spec: &ParserSpec) -> ParseResult<f64> {
    let result = match spec {
        ParserSpec::Regex { pattern } => extract_regex(raw, pattern)?,
        ParserSpec::Json { json_path } => extract_json_value(raw, json_path)?,
        ParserSpec::Line { line_num } => extract_line(raw, *line_num)?,
        ParserSpec::Split { split, index } => extract_split(raw, split, *index)?,
        ParserSpec::Raw => raw.trim().to_string(),
    };

    to_number(&result)
}

/// Convert extracted text to a float
pub fn to_number(text: &str) -> ParseResult<f64> {
    text.parse::<f64>()
        .map_err(|_| ParseError::NotANumber(text.to_string()))
}
