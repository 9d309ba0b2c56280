//! Text completion streams.

use super::recorder::ResponseAccumulator;
use crate::accumulator::{ScalarReplace, StringAccumulator, ValuesAccumulator};
use crate::errors::TelemetryResult;
use crate::observability::{
    attribute_names, json_output_attributes, Attribute, AttributeSource, AttributeValue,
};
use crate::types::Completion;
use serde_json::{Map, Value};

/// Accumulates [`Completion`] chunks.
///
/// The text is concatenated, `stop` and `stop_reason` keep their last value,
/// and any other field set on a chunk (`id`, `model`, ...) is kept as-is.
#[derive(Debug, Clone)]
pub struct CompletionAccumulator {
    is_null: bool,
    values: ValuesAccumulator,
}

impl CompletionAccumulator {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self {
            is_null: true,
            values: ValuesAccumulator::new()
                .with_slot("completion", StringAccumulator::new())
                .with_slot("stop", ScalarReplace::new())
                .with_slot("stop_reason", ScalarReplace::new()),
        }
    }
}

impl Default for CompletionAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseAccumulator for CompletionAccumulator {
    type Chunk = Completion;

    fn process_chunk(&mut self, chunk: &Completion) {
        self.is_null = false;
        self.values.merge(Some(&chunk.set_fields()));
    }

    fn result(&self) -> Option<Map<String, Value>> {
        if self.is_null {
            return None;
        }
        Some(self.values.snapshot())
    }

    fn extractor(&self) -> Box<dyn AttributeSource + '_> {
        Box::new(CompletionExtractor::new(self))
    }
}

/// Extracts span attributes from a [`CompletionAccumulator`].
pub struct CompletionExtractor<'a> {
    accumulator: &'a CompletionAccumulator,
}

impl<'a> CompletionExtractor<'a> {
    /// Creates an extractor reading `accumulator`.
    pub fn new(accumulator: &'a CompletionAccumulator) -> Self {
        Self { accumulator }
    }

    fn result(&self) -> Option<Map<String, Value>> {
        self.accumulator.result().filter(|result| !result.is_empty())
    }
}

impl AttributeSource for CompletionExtractor<'_> {
    fn attributes(&self) -> TelemetryResult<Vec<Attribute>> {
        Ok(self
            .result()
            .map(|result| json_output_attributes(&Value::Object(result)))
            .unwrap_or_default())
    }

    fn extra_attributes(&self) -> TelemetryResult<Vec<Attribute>> {
        let completion = self
            .result()
            .and_then(|result| result.get("completion").and_then(Value::as_str).map(str::to_string))
            .filter(|completion| !completion.is_empty());

        Ok(completion
            .map(|completion| {
                vec![(
                    attribute_names::LLM_OUTPUT_MESSAGES.to_string(),
                    AttributeValue::String(completion),
                )]
            })
            .unwrap_or_default())
    }
}
