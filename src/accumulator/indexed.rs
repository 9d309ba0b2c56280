//! Sparse, index-keyed collection of composite accumulators.

use super::ValuesAccumulator;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Field that selects the child an update belongs to.
pub const INDEX_KEY: &str = "index";

/// Integer-keyed children created lazily on first reference.
///
/// Updates must carry an [`INDEX_KEY`] field (an integer or an integer-like
/// string). The remaining fields are merged into the child at that index.
/// Snapshots are ordered by index, not by arrival.
#[derive(Debug, Clone)]
pub struct IndexedAccumulator {
    factory: fn() -> ValuesAccumulator,
    children: BTreeMap<i64, ValuesAccumulator>,
}

impl IndexedAccumulator {
    /// Creates an empty collection whose children are built by `factory`.
    pub fn new(factory: fn() -> ValuesAccumulator) -> Self {
        Self {
            factory,
            children: BTreeMap::new(),
        }
    }

    /// Merges an update into the child named by its `index` field.
    ///
    /// Updates that are not mappings, or whose index is missing or not an
    /// integer, are dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use integrations_stream_telemetry::accumulator::{
    ///     IndexedAccumulator, StringAccumulator, ValuesAccumulator,
    /// };
    /// use serde_json::json;
    ///
    /// let mut messages = IndexedAccumulator::new(|| {
    ///     ValuesAccumulator::new().with_slot("text", StringAccumulator::new())
    /// });
    /// messages.merge(&json!({"index": 1, "text": "b"}));
    /// messages.merge(&json!({"index": "0", "text": "a"}));
    /// messages.merge(&json!({"text": "dropped"}));
    ///
    /// let snapshot = messages.snapshot();
    /// assert_eq!(snapshot.len(), 2);
    /// assert_eq!(snapshot[0]["text"], "a");
    /// assert_eq!(snapshot[1]["text"], "b");
    /// ```
    pub fn merge(&mut self, update: &Value) {
        let Some(fields) = update.as_object() else {
            tracing::trace!("Dropping indexed update that is not a mapping");
            return;
        };
        let Some(index) = fields.get(INDEX_KEY).and_then(parse_index) else {
            tracing::trace!(
                index = ?fields.get(INDEX_KEY),
                "Dropping indexed update without a usable index"
            );
            return;
        };

        let factory = self.factory;
        let child = self.children.entry(index).or_insert_with(factory);
        child.merge_entries(fields.iter().filter(|(key, _)| key.as_str() != INDEX_KEY));
    }

    /// Returns the snapshot of every child, ascending by index.
    pub fn snapshot(&self) -> Vec<Map<String, Value>> {
        self.children.values().map(ValuesAccumulator::snapshot).collect()
    }

    /// Returns the indices seen so far, ascending.
    pub fn indices(&self) -> impl Iterator<Item = i64> + '_ {
        self.children.keys().copied()
    }

    /// Number of children created so far.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns true if no child has been created.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

fn parse_index(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
