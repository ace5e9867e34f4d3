use regex::Regex;

use super::{ParseError, ParseResult};

/// First capture group of the first match of `pattern`
pub fn extract_regex(raw: &str, pattern: &str) -> ParseResult<String> {
    let re = Regex::new(pattern).map_err(|e| ParseError::InvalidPattern(e.to_string()))?;

    re.captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or(ParseError::NoMatch)
}

/// Zero-based line of the trimmed payload, itself trimmed
pub fn extract_line(raw: &str, line_num: usize) -> ParseResult<String> {
    raw.trim()
        .split('\n')
        .nth(line_num)
        .map(|line| line.trim().to_string())
        .ok_or(ParseError::LineOutOfRange(line_num))
}

/// Zero-based token of the trimmed payload split on `delimiter`, itself trimmed
///
/// An empty delimiter splits the payload into individual characters.
pub fn extract_split(raw: &str, delimiter: &str, index: usize) -> ParseResult<String> {
    let trimmed = raw.trim();

    let token = if delimiter.is_empty() {
        trimmed.chars().nth(index).map(String::from)
    } else {
        trimmed.split(delimiter).nth(index).map(str::to_string)
    };

    token
        .map(|t| t.trim().to_string())
        .ok_or(ParseError::SplitOutOfRange(index))
}
