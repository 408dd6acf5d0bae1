//! Parses cleaned text and checks its top-level kind.

use serde_json::Value as JsonValue;

/// Top-level kind the caller asked the generator for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    Array,
    Object,
}

impl Expectation {
    fn matches(&self, value: &JsonValue) -> bool {
        match self {
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("The generator returned no structured content")]
    Empty,

    #[error("The generator output is not valid JSON: {0}")]
    Syntax(String),

    #[error("Expected a JSON {expected} but the generator returned a JSON {found}")]
    WrongKind {
        expected: &'static str,
        found: &'static str,
    },
}

fn kind_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// Parse `cleaned` and require the declared top-level kind.
///
/// No field-level validation happens here.
pub fn parse_structured(cleaned: &str, expect: Expectation) -> Result<JsonValue, ParseError> {
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Err(ParseError::Empty);
    }

    let value: JsonValue =
        serde_json::from_str(cleaned).map_err(|e| ParseError::Syntax(e.to_string()))?;

    if !expect.matches(&value) {
        return Err(ParseError::WrongKind {
            expected: expect.name(),
            found: kind_name(&value),
        });
    }
    Ok(value)
}
