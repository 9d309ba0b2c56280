//! Recursive composite accumulator.

use super::{IndexedAccumulator, ScalarReplace, StringAccumulator};
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Storage location within a [`ValuesAccumulator`].
///
/// The kind of every declared slot is fixed at construction; merges dispatch
/// on the tag.
#[derive(Debug, Clone)]
pub enum Slot {
    /// Append-only text
    Text(StringAccumulator),
    /// Last non-empty string wins
    Replace(ScalarReplace),
    /// Children keyed by an `index` field
    Indexed(IndexedAccumulator),
    /// Nested composite
    Values(ValuesAccumulator),
    /// Verbatim value for a key that was not declared
    Opaque(Value),
}

impl Slot {
    /// Builds the slot for a key seen for the first time.
    fn admit(value: &Value) -> Self {
        match value {
            Value::Object(fields) => Slot::Values(ValuesAccumulator::from_map(fields)),
            other => Slot::Opaque(other.clone()),
        }
    }

    fn merge(&mut self, value: &Value) {
        match self {
            Slot::Values(values) => match value.as_object() {
                Some(fields) => values.merge(Some(fields)),
                None => tracing::trace!("Dropping non-mapping update for composite slot"),
            },
            Slot::Text(text) => text.merge(value.as_str()),
            Slot::Replace(field) => field.merge(value.as_str()),
            Slot::Indexed(indexed) => indexed.merge(value),
            Slot::Opaque(current) => match (current, value) {
                (Value::Array(items), Value::Array(more)) => items.extend(more.iter().cloned()),
                (current, value) => *current = value.clone(),
            },
        }
    }

    /// Effective value of the slot, or `None` when it should be omitted.
    fn snapshot(&self) -> Option<Value> {
        match self {
            Slot::Text(text) => Some(text.snapshot())
                .filter(|text| !text.is_empty())
                .map(Value::String),
            Slot::Replace(field) => Some(field.snapshot())
                .filter(|value| !value.is_empty())
                .map(|value| Value::String(value.to_string())),
            Slot::Indexed(indexed) => {
                let items = indexed.snapshot();
                if items.is_empty() {
                    None
                } else {
                    Some(Value::Array(items.into_iter().map(Value::Object).collect()))
                }
            }
            Slot::Values(values) => {
                let fields = values.snapshot();
                if fields.is_empty() {
                    None
                } else {
                    Some(Value::Object(fields))
                }
            }
            Slot::Opaque(Value::Null) => None,
            Slot::Opaque(value) => Some(value.clone()),
        }
    }
}

impl From<StringAccumulator> for Slot {
    fn from(text: StringAccumulator) -> Self {
        Slot::Text(text)
    }
}

impl From<ScalarReplace> for Slot {
    fn from(field: ScalarReplace) -> Self {
        Slot::Replace(field)
    }
}

impl From<IndexedAccumulator> for Slot {
    fn from(indexed: IndexedAccumulator) -> Self {
        Slot::Indexed(indexed)
    }
}

impl From<ValuesAccumulator> for Slot {
    fn from(values: ValuesAccumulator) -> Self {
        Slot::Values(values)
    }
}

impl From<Value> for Slot {
    fn from(value: Value) -> Self {
        Slot::Opaque(value)
    }
}

/// A named set of slots merged field-by-field.
///
/// Declared slots keep their kind for the lifetime of the accumulator. Keys
/// that were not declared are deep-copied on first sight: mappings become a
/// nested `ValuesAccumulator` so later updates merge structurally, anything
/// else is kept as an opaque value.
#[derive(Debug, Clone, Default)]
pub struct ValuesAccumulator {
    slots: IndexMap<String, Slot>,
}

impl ValuesAccumulator {
    /// Creates an accumulator with no declared slots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a slot. Declaration order is the snapshot order.
    pub fn with_slot(mut self, name: impl Into<String>, slot: impl Into<Slot>) -> Self {
        self.slots.insert(name.into(), slot.into());
        self
    }

    /// Builds an accumulator holding a copy of `fields`.
    ///
    /// Only the top level becomes mergeable: every field is kept as an
    /// opaque value, so a nested mapping is later replaced as a whole.
    pub fn from_map(fields: &Map<String, Value>) -> Self {
        let slots = fields
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(key, value)| (key.clone(), Slot::Opaque(value.clone())))
            .collect();
        Self { slots }
    }

    /// Merges a partial update. Absent or empty updates are a no-op, and
    /// null values never touch a slot.
    pub fn merge(&mut self, update: Option<&Map<String, Value>>) {
        if let Some(update) = update {
            self.merge_entries(update);
        }
    }

    pub(crate) fn merge_entries<'a>(
        &mut self,
        entries: impl IntoIterator<Item = (&'a String, &'a Value)>,
    ) {
        for (key, value) in entries {
            if value.is_null() {
                continue;
            }
            match self.slots.get_mut(key) {
                Some(slot) => slot.merge(value),
                None => {
                    self.slots.insert(key.clone(), Slot::admit(value));
                }
            }
        }
    }

    /// Returns every slot with a non-empty effective value, in slot order.
    pub fn snapshot(&self) -> Map<String, Value> {
        self.slots
            .iter()
            .filter_map(|(name, slot)| slot.snapshot().map(|value| (name.clone(), value)))
            .collect()
    }

    /// Returns the slot with the given name.
    pub fn slot(&self, name: &str) -> Option<&Slot> {
        self.slots.get(name)
    }

    /// Returns true if the snapshot would be empty.
    pub fn is_empty(&self) -> bool {
        self.slots.values().all(|slot| slot.snapshot().is_none())
    }
}
