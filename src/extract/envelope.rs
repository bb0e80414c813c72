use crate::RippleError;
use serde::Deserialize;
use serde_json::Value;

/// JSON envelope convention used by a content API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
pub enum ResponseShape {
    /// `{ "content": "..." }`
    #[default]
    #[serde(rename = "root", alias = "content_in_root")]
    Root,
    /// `{ "data": { "content": "..." } }`
    #[serde(rename = "data", alias = "content_in_data")]
    Data,
}

impl ResponseShape {
    /// Dotted path of the required content field, used in error messages
    pub fn field_path(&self) -> &'static str {
        match self {
            Self::Root => "content",
            Self::Data => "data.content",
        }
    }
}

/// Pulls the chapter content out of a parsed API response
///
/// Only the presence of the field required by `shape` matters; status or code
/// fields elsewhere in the envelope are ignored.
///
/// # Examples
///
/// ```
/// use chapter_ripple::extract::{extract_content, ResponseShape};
/// use serde_json::json;
///
/// let raw = json!({"data": {"content": "X"}});
/// assert_eq!(extract_content(&raw, ResponseShape::Data).unwrap(), "X");
/// assert!(extract_content(&json!({"content": "X"}), ResponseShape::Data).is_err());
/// ```
pub fn extract_content(response: &Value, shape: ResponseShape) -> Result<String, RippleError> {
    let field = shape.field_path();
    let content = match shape {
        ResponseShape::Root => response.get("content"),
        ResponseShape::Data => response.get("data").and_then(|data| data.get("content")),
    };

    match content {
        None | Some(Value::Null) => Err(RippleError::MissingField { field }),
        Some(Value::String(text)) => Ok(text.clone()),
        Some(other) => Err(RippleError::InvalidField {
            field,
            message: format!("expected a string, got {}", json_kind(other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
