// src/ai/parser.rs
//! Response Parser
//!
//! Turns the model's response text into an `ExtractionResult`.
//!
//! ## Normalization
//!
//! - Surrounding whitespace is trimmed
//! - A ```` ```json ```` / ```` ``` ```` fence opened before any `{` is
//!   unwrapped (the block ends at the next fence, so prose after it is dropped)
//! - Decoding starts at the first `{` that opens a JSON object; braces in
//!   leading prose are skipped
//! - Only the first JSON object is decoded; trailing text is ignored
//!
//! The decoded value must be a JSON object. Values are stringified, `null`
//! counts as missing, unknown keys are ignored.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::sheets::{Field, SENTINEL};

/// Decoded model output, keyed by schema field.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExtractionResult {
    values: BTreeMap<Field, String>,
}

impl ExtractionResult {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// Schema fields the response did not supply.
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| !self.values.contains_key(f))
            .collect()
    }

    #[cfg(test)]
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// One update per schema field; absent fields get the sentinel.
    pub fn cell_updates(&self) -> Vec<(Field, String)> {
        Field::ALL
            .into_iter()
            .map(|f| (f, self.get(f).unwrap_or(SENTINEL).to_string()))
            .collect()
    }
}

/// Why a response could not be decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseFailure {
    Empty,
    NotJson(String),
    NotAnObject,
}

impl std::fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseFailure::Empty => write!(f, "empty response"),
            ParseFailure::NotJson(e) => write!(f, "JSON parse error: {}", e),
            ParseFailure::NotAnObject => write!(f, "response is not a JSON object"),
        }
    }
}

/// Body of the code fence wrapping the response, if the response opens one
/// before any JSON. A fence that only appears after the JSON is prose.
fn fenced_body(text: &str) -> Option<&str> {
    let fence = text.find("```")?;
    if text.find('{').is_some_and(|brace| brace < fence) {
        return None;
    }
    let after = &text[fence + 3..];
    // Drop the info string (`json`) on the opening fence line
    let after = match after.find('\n') {
        Some(nl) if !after[..nl].trim_start().starts_with('{') => &after[nl + 1..],
        _ => after.strip_prefix("json").unwrap_or(after),
    };
    let body = match after.find("```") {
        Some(end) => &after[..end],
        None => after,
    };
    Some(body.trim())
}

/// Strip a wrapping code fence, leaving the text that holds the JSON.
pub fn normalize_response(text: &str) -> &str {
    let text = text.trim();
    fenced_body(text).unwrap_or(text)
}

/// Decode the first JSON object in `body`, trying each `{` in turn so braces
/// in leading prose are skipped. Trailing text after the object is ignored.
fn decode_object(body: &str) -> Result<Map<String, Value>, ParseFailure> {
    let mut first_failure = None;
    for (start, _) in body.match_indices('{') {
        let mut stream = serde_json::Deserializer::from_str(&body[start..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(Value::Object(map))) => return Ok(map),
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                first_failure.get_or_insert(ParseFailure::NotJson(e.to_string()));
            }
            None => {}
        }
    }
    if let Some(failure) = first_failure {
        return Err(failure);
    }

    // No object anywhere: report what the text is instead
    match serde_json::from_str::<Value>(body) {
        Ok(_) => Err(ParseFailure::NotAnObject),
        Err(e) => Err(ParseFailure::NotJson(e.to_string())),
    }
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// Decode a model response into an `ExtractionResult`.
pub fn parse_response(text: &str) -> Result<ExtractionResult, ParseFailure> {
    let body = normalize_response(text);
    if body.is_empty() {
        return Err(ParseFailure::Empty);
    }

    let map = match decode_object(body) {
        Ok(map) => map,
        // A fenced block that does not decode may still leave JSON outside it
        Err(failure) if body.len() < text.trim().len() => {
            decode_object(text.trim()).map_err(|_| failure)?
        }
        Err(failure) => return Err(failure),
    };

    let values = map
        .iter()
        .filter_map(|(key, v)| {
            let field = Field::from_key(key.trim())?;
            value_to_string(v).map(|s| (field, s))
        })
        .collect();
    Ok(ExtractionResult { values })
}

/// First `max` characters of a response, for log lines.
pub fn snippet(text: &str, max: usize) -> String {
    let mut out: String = text.chars().take(max).collect();
    if text.chars().count() > max {
        out.push_str("...");
    }
    out
}
