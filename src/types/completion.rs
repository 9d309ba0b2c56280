//! Legacy text completion chunks.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One chunk of a streamed text completion.
///
/// Every field is optional: a chunk only carries what the server set, and
/// [`Completion::set_fields`] projects exactly those.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Completion {
    /// Completion ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Object type (always "completion")
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub completion_type: Option<String>,
    /// Text fragment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion: Option<String>,
    /// Stop sequence that ended generation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<String>,
    /// Reason generation stopped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
    /// Model that produced the chunk
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl Completion {
    /// Creates a chunk carrying only a text fragment.
    pub fn text(fragment: impl Into<String>) -> Self {
        Self {
            completion: Some(fragment.into()),
            ..Default::default()
        }
    }

    /// Sets the stop reason.
    pub fn with_stop_reason(mut self, stop_reason: impl Into<String>) -> Self {
        self.stop_reason = Some(stop_reason.into());
        self
    }

    /// Sets the stop sequence.
    pub fn with_stop(mut self, stop: impl Into<String>) -> Self {
        self.stop = Some(stop.into());
        self
    }

    /// Returns the fields present on this chunk as a partial update.
    pub fn set_fields(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(fields)) => fields,
            _ => Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_fields_excludes_unset() {
        let chunk = Completion::text("Hi").with_stop_reason("stop_sequence");
        assert_eq!(
            Value::Object(chunk.set_fields()),
            json!({"completion": "Hi", "stop_reason": "stop_sequence"})
        );
    }

    #[test]
    fn test_deserialize_wire_chunk() {
        let chunk: Completion = serde_json::from_str(
            r#"{"type":"completion","id":"compl_1","completion":" there","stop_reason":null,"model":"claude-2.1"}"#,
        )
        .unwrap();
        assert_eq!(chunk.completion.as_deref(), Some(" there"));
        assert_eq!(chunk.completion_type.as_deref(), Some("completion"));
        assert!(chunk.stop_reason.is_none());
        assert!(!chunk.set_fields().contains_key("stop_reason"));
    }
}
