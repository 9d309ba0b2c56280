//! Messages API event streams.

use super::recorder::ResponseAccumulator;
use crate::accumulator::{
    IndexedAccumulator, ScalarReplace, StringAccumulator, ValuesAccumulator, INDEX_KEY,
};
use crate::errors::{TelemetryError, TelemetryResult};
use crate::observability::{
    attribute_names, json_output_attributes, Attribute, AttributeSource, AttributeValue,
};
use crate::types::{MessageStreamEvent, StopReason};
use serde_json::{json, Map, Value};

const MESSAGES: &str = "messages";

fn message_values() -> ValuesAccumulator {
    ValuesAccumulator::new()
        .with_slot("role", ScalarReplace::new())
        .with_slot(
            "delta",
            ValuesAccumulator::new().with_slot("text", StringAccumulator::new()),
        )
        .with_slot("stop_reason", ScalarReplace::new())
        .with_slot("input_tokens", ScalarReplace::new())
        .with_slot("output_tokens", ScalarReplace::new())
}

/// Accumulates [`MessageStreamEvent`]s into per-message state.
///
/// `message_start` opens a new message; content deltas and `message_delta`
/// events are attributed to the most recently started message. Other
/// events are ignored.
#[derive(Debug, Clone)]
pub struct MessageAccumulator {
    is_null: bool,
    current_message_index: i64,
    values: ValuesAccumulator,
}

impl MessageAccumulator {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self {
            is_null: true,
            current_message_index: -1,
            values: ValuesAccumulator::new()
                .with_slot(MESSAGES, IndexedAccumulator::new(message_values)),
        }
    }

    /// Index of the most recently started message, -1 before the first.
    pub fn current_message_index(&self) -> i64 {
        self.current_message_index
    }

    fn merge_message(&mut self, mut update: Map<String, Value>) {
        update.insert(
            INDEX_KEY.to_string(),
            Value::String(self.current_message_index.to_string()),
        );
        let mut root = Map::new();
        root.insert(MESSAGES.to_string(), Value::Object(update));
        self.values.merge(Some(&root));
    }
}

impl Default for MessageAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseAccumulator for MessageAccumulator {
    type Chunk = MessageStreamEvent;

    fn process_chunk(&mut self, chunk: &MessageStreamEvent) {
        self.is_null = false;
        let update = match chunk {
            MessageStreamEvent::MessageStart { message } => {
                self.current_message_index += 1;
                json!({
                    "role": message.role.as_str(),
                    "input_tokens": message.usage.input_tokens.to_string(),
                })
            }
            MessageStreamEvent::ContentBlockDelta { delta, .. } => json!({
                "delta": { "text": delta.text },
            }),
            MessageStreamEvent::MessageDelta { delta, usage } => json!({
                "stop_reason": delta.stop_reason.as_ref().map(StopReason::as_str),
                "output_tokens": usage.output_tokens.to_string(),
            }),
            _ => return,
        };
        if let Value::Object(update) = update {
            self.merge_message(update);
        }
    }

    fn result(&self) -> Option<Map<String, Value>> {
        if self.is_null {
            return None;
        }
        Some(self.values.snapshot())
    }

    fn extractor(&self) -> Box<dyn AttributeSource + '_> {
        Box::new(MessageExtractor::new(self))
    }
}

/// Extracts span attributes from a [`MessageAccumulator`].
///
/// Per-message attribute keys use the message's position in the snapshot,
/// which matches the stream's message index when indices start at zero and
/// have no gaps.
pub struct MessageExtractor<'a> {
    accumulator: &'a MessageAccumulator,
}

impl<'a> MessageExtractor<'a> {
    /// Creates an extractor reading `accumulator`.
    pub fn new(accumulator: &'a MessageAccumulator) -> Self {
        Self { accumulator }
    }

    fn result(&self) -> Option<Map<String, Value>> {
        self.accumulator.result().filter(|result| !result.is_empty())
    }
}

impl AttributeSource for MessageExtractor<'_> {
    fn attributes(&self) -> TelemetryResult<Vec<Attribute>> {
        Ok(self
            .result()
            .map(|result| json_output_attributes(&Value::Object(result)))
            .unwrap_or_default())
    }

    fn extra_attributes(&self) -> TelemetryResult<Vec<Attribute>> {
        let Some(result) = self.result() else {
            return Ok(Vec::new());
        };
        let messages = result
            .get(MESSAGES)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let mut attributes = Vec::new();
        let mut completion_tokens = 0i64;
        let mut prompt_tokens = 0i64;
        for (position, message) in messages.iter().enumerate() {
            let prefix = format!("{}.{}", attribute_names::LLM_OUTPUT_MESSAGES, position);
            if let Some(text) = message.pointer("/delta/text").and_then(Value::as_str) {
                attributes.push((
                    format!("{}.{}", prefix, attribute_names::MESSAGE_CONTENT),
                    AttributeValue::from(text),
                ));
            }
            if let Some(role) = message.get("role").and_then(Value::as_str) {
                attributes.push((
                    format!("{}.{}", prefix, attribute_names::MESSAGE_ROLE),
                    AttributeValue::from(role),
                ));
            }
            completion_tokens =
                completion_tokens.saturating_add(token_count(message, "output_tokens")?);
            prompt_tokens = prompt_tokens.saturating_add(token_count(message, "input_tokens")?);
        }

        attributes.push((
            attribute_names::LLM_TOKEN_COUNT_COMPLETION.to_string(),
            AttributeValue::Int(completion_tokens),
        ));
        attributes.push((
            attribute_names::LLM_TOKEN_COUNT_PROMPT.to_string(),
            AttributeValue::Int(prompt_tokens),
        ));
        attributes.push((
            attribute_names::LLM_TOKEN_COUNT_TOTAL.to_string(),
            AttributeValue::Int(completion_tokens.saturating_add(prompt_tokens)),
        ));
        Ok(attributes)
    }
}

/// Reads an accumulated token count. Absent or empty counts are zero;
/// anything that is not an integer is an error.
fn token_count(message: &Value, field: &str) -> TelemetryResult<i64> {
    let invalid = |value: String| TelemetryError::InvalidTokenCount {
        field: field.to_string(),
        value,
    };
    match message.get(field) {
        None | Some(Value::Null) => Ok(0),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(0),
        Some(Value::String(text)) => text.trim().parse().map_err(|_| invalid(text.clone())),
        Some(Value::Number(number)) => number.as_i64().ok_or_else(|| invalid(number.to_string())),
        Some(other) => Err(invalid(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;
    use pretty_assertions::assert_eq;

    fn extra(accumulator: &MessageAccumulator) -> Vec<Attribute> {
        MessageExtractor::new(accumulator).extra_attributes().unwrap()
    }

    #[test]
    fn test_index_advances_on_message_start_only() {
        let mut accumulator = MessageAccumulator::new();
        assert_eq!(accumulator.current_message_index(), -1);

        accumulator.process_chunk(&MessageStreamEvent::message_start(Role::Assistant, 1));
        accumulator.process_chunk(&MessageStreamEvent::text_delta(0, "a"));
        accumulator.process_chunk(&MessageStreamEvent::Ping);
        assert_eq!(accumulator.current_message_index(), 0);

        accumulator.process_chunk(&MessageStreamEvent::message_start(Role::Assistant, 1));
        assert_eq!(accumulator.current_message_index(), 1);
    }

    #[test]
    fn test_interleaved_content_blocks_join_current_message() {
        let mut accumulator = MessageAccumulator::new();
        accumulator.process_chunk(&MessageStreamEvent::message_start(Role::Assistant, 3));
        accumulator.process_chunk(&MessageStreamEvent::text_delta(0, "one "));
        accumulator.process_chunk(&MessageStreamEvent::text_delta(1, "two "));
        accumulator.process_chunk(&MessageStreamEvent::text_delta(0, "three"));

        let result = accumulator.result().unwrap();
        assert_eq!(result["messages"][0]["delta"]["text"], "one two three");
    }

    #[test]
    fn test_non_text_delta_adds_nothing() {
        let mut accumulator = MessageAccumulator::new();
        accumulator.process_chunk(&MessageStreamEvent::message_start(Role::Assistant, 3));
        accumulator.process_chunk(&MessageStreamEvent::ContentBlockDelta {
            index: 0,
            delta: crate::types::ContentDelta {
                delta_type: "input_json_delta".to_string(),
                text: None,
                partial_json: Some("{\"city\":".to_string()),
                thinking: None,
            },
        });

        let result = accumulator.result().unwrap();
        assert!(result["messages"][0].get("delta").is_none());
    }

    #[test]
    fn test_non_contiguous_indices_use_sequence_position() {
        let mut accumulator = MessageAccumulator::new();
        accumulator.merge_message(json!({"role": "assistant"}).as_object().cloned().unwrap());
        accumulator.current_message_index = 5;
        accumulator.merge_message(
            json!({"role": "assistant", "delta": {"text": "late"}})
                .as_object()
                .cloned()
                .unwrap(),
        );
        accumulator.is_null = false;

        let attributes = extra(&accumulator);
        let keys: Vec<&str> = attributes.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "llm.output_messages.0.message.role",
                "llm.output_messages.1.message.content",
                "llm.output_messages.1.message.role",
                "llm.token_count.completion",
                "llm.token_count.prompt",
                "llm.token_count.total",
            ]
        );
    }

    #[test]
    fn test_malformed_token_count_is_an_error() {
        let mut accumulator = MessageAccumulator::new();
        accumulator.is_null = false;
        accumulator.current_message_index = 0;
        accumulator.merge_message(
            json!({"role": "assistant", "output_tokens": "many"})
                .as_object()
                .cloned()
                .unwrap(),
        );

        let error = MessageExtractor::new(&accumulator)
            .extra_attributes()
            .unwrap_err();
        assert_eq!(
            error,
            TelemetryError::InvalidTokenCount {
                field: "output_tokens".to_string(),
                value: "many".to_string(),
            }
        );
    }

    #[test]
    fn test_huge_token_counts_saturate() {
        let mut accumulator = MessageAccumulator::new();
        accumulator.is_null = false;
        let huge = i64::MAX.to_string();
        for index in 0..2 {
            accumulator.current_message_index = index;
            accumulator.merge_message(
                json!({"output_tokens": huge, "input_tokens": huge})
                    .as_object()
                    .cloned()
                    .unwrap(),
            );
        }

        let attributes = extra(&accumulator);
        for (_, value) in &attributes {
            assert_eq!(value, &AttributeValue::Int(i64::MAX));
        }
        assert_eq!(attributes.len(), 3);
    }

    #[test]
    fn test_unknown_stop_reason_is_accumulated() {
        let mut accumulator = MessageAccumulator::new();
        accumulator.process_chunk(&MessageStreamEvent::message_start(Role::Assistant, 1));
        accumulator.process_chunk(&MessageStreamEvent::message_delta(
            Some(StopReason::Other("pause_turn".to_string())),
            4,
        ));

        let result = accumulator.result().unwrap();
        assert_eq!(result["messages"][0]["stop_reason"], "pause_turn");
    }

    #[test]
    fn test_token_count_parsing() {
        let message = json!({"a": "12", "b": "", "c": 7, "d": "x", "e": true});
        assert_eq!(token_count(&message, "a").unwrap(), 12);
        assert_eq!(token_count(&message, "b").unwrap(), 0);
        assert_eq!(token_count(&message, "c").unwrap(), 7);
        assert_eq!(token_count(&message, "missing").unwrap(), 0);
        assert!(token_count(&message, "d").is_err());
        assert!(token_count(&message, "e").is_err());
    }

    #[test]
    fn test_ignored_events_still_mark_stream_seen() {
        let mut accumulator = MessageAccumulator::new();
        assert!(accumulator.result().is_none());

        accumulator.process_chunk(&MessageStreamEvent::Ping);
        assert_eq!(accumulator.result(), Some(Map::new()));
        assert!(extra(&accumulator).is_empty());
    }
}
