//! Span attribute values and names.

use crate::errors::TelemetryResult;
use serde_json::Value;
use std::fmt;

/// Attribute names attached to LLM spans.
pub mod attribute_names {
    /// Kind of the span ("LLM")
    pub const SPAN_KIND: &str = "openinference.span.kind";
    /// Provider that served the request
    pub const LLM_PROVIDER: &str = "llm.provider";
    /// Serialized response payload
    pub const OUTPUT_VALUE: &str = "output.value";
    /// MIME type of `output.value`
    pub const OUTPUT_MIME_TYPE: &str = "output.mime_type";
    /// Output message text, or prefix of per-message attributes
    pub const LLM_OUTPUT_MESSAGES: &str = "llm.output_messages";
    /// Per-message content suffix
    pub const MESSAGE_CONTENT: &str = "message.content";
    /// Per-message role suffix
    pub const MESSAGE_ROLE: &str = "message.role";
    /// Total completion tokens
    pub const LLM_TOKEN_COUNT_COMPLETION: &str = "llm.token_count.completion";
    /// Total prompt tokens
    pub const LLM_TOKEN_COUNT_PROMPT: &str = "llm.token_count.prompt";
    /// Completion plus prompt tokens
    pub const LLM_TOKEN_COUNT_TOTAL: &str = "llm.token_count.total";
    /// Name of the event recorded for an exception
    pub const EXCEPTION_EVENT: &str = "exception";
    /// Exception type on an exception event
    pub const EXCEPTION_TYPE: &str = "exception.type";
    /// Exception message on an exception event
    pub const EXCEPTION_MESSAGE: &str = "exception.message";
}

/// MIME type for JSON output values
pub const JSON_MIME_TYPE: &str = "application/json";

/// Value of a span attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// String value
    String(String),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// Boolean value
    Bool(bool),
}

impl AttributeValue {
    /// Returns the string value, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the integer value, if this is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Int(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::String(value) => f.write_str(value),
            AttributeValue::Int(value) => write!(f, "{}", value),
            AttributeValue::Float(value) => write!(f, "{}", value),
            AttributeValue::Bool(value) => write!(f, "{}", value),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Int(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Float(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

/// A span attribute key/value pair
pub type Attribute = (String, AttributeValue);

/// Source of the attributes written when a span is finished.
///
/// `attributes` carries the general payload (output value and type);
/// `extra_attributes` carries derived attributes such as per-message content
/// and token counts.
pub trait AttributeSource {
    /// Returns the general attributes.
    fn attributes(&self) -> TelemetryResult<Vec<Attribute>>;

    /// Returns the derived attributes.
    fn extra_attributes(&self) -> TelemetryResult<Vec<Attribute>>;
}

/// Serializes a JSON value to a string. Never fails.
pub fn safe_json_string(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| value.to_string())
}

/// Builds the `output.value` / `output.mime_type` pair for a JSON payload.
pub fn json_output_attributes(value: &Value) -> Vec<Attribute> {
    vec![
        (
            attribute_names::OUTPUT_VALUE.to_string(),
            AttributeValue::String(safe_json_string(value)),
        ),
        (
            attribute_names::OUTPUT_MIME_TYPE.to_string(),
            AttributeValue::from(JSON_MIME_TYPE),
        ),
    ]
}
