//! Incremental accumulation of partial updates.
//!
//! Streaming responses arrive as a sequence of partial updates. Each chunk is
//! projected into a `serde_json::Map` and merged into a tree of accumulators
//! whose shape is declared once per stream:
//!
//! - [`StringAccumulator`]: append-only text
//! - [`ScalarReplace`]: last non-empty value wins
//! - [`IndexedAccumulator`]: lazily created children keyed by an `index` field
//! - [`ValuesAccumulator`]: named [`Slot`]s, recursively merged
//!
//! ## Examples
//!
//! ```
//! use integrations_stream_telemetry::accumulator::{
//!     ScalarReplace, StringAccumulator, ValuesAccumulator,
//! };
//! use serde_json::json;
//!
//! let mut values = ValuesAccumulator::new()
//!     .with_slot("completion", StringAccumulator::new())
//!     .with_slot("stop_reason", ScalarReplace::new());
//!
//! values.merge(json!({"completion": "Hel"}).as_object());
//! values.merge(json!({"completion": "lo", "stop_reason": "stop"}).as_object());
//!
//! assert_eq!(
//!     serde_json::Value::Object(values.snapshot()),
//!     json!({"completion": "Hello", "stop_reason": "stop"})
//! );
//! ```

mod indexed;
mod scalar;
mod string;
mod values;


pub use indexed::{IndexedAccumulator, INDEX_KEY};
pub use scalar::ScalarReplace;
pub use string::StringAccumulator;
pub use values::{Slot, ValuesAccumulator};
