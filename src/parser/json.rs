use serde_json::Value;

use super::{ParseError, ParseResult};

/// Decode `raw` as JSON and render the value found at the dot-separated `path`
///
/// An empty path renders the whole document.
pub fn extract_json_value(raw: &str, path: &str) -> ParseResult<String> {
    let document: Value =
        serde_json::from_str(raw).map_err(|e| ParseError::InvalidJson(e.to_string()))?;

    if path.is_empty() {
        return Ok(render_json(&document));
    }

    let segments: Vec<&str> = path.split('.').collect();
    resolve(&document, &segments).map(render_json)
}

fn resolve<'a>(value: &'a Value, segments: &[&str]) -> ParseResult<&'a Value> {
    let Some((segment, rest)) = segments.split_first() else {
        return Ok(value);
    };

    let next = match value {
        Value::Object(map) => map
            .get(*segment)
            .ok_or_else(|| ParseError::PathNotFound(segment.to_string()))?,
        Value::Array(items) => {
            let index: usize = segment
                .parse()
                .map_err(|_| ParseError::InvalidIndex(segment.to_string()))?;
            items.get(index).ok_or(ParseError::IndexOutOfRange(index))?
        }
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            return Err(ParseError::NotNavigable(segment.to_string()));
        }
    };

    resolve(next, rest)
}

/// String form of a JSON value; strings render without quotes
pub fn render_json(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
