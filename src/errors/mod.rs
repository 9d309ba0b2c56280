//! Error types for the stream telemetry crate.
//!
//! Merge logic never fails: malformed partial updates are dropped. Errors only
//! surface from attribute extraction, configuration and logging setup.

mod error;

pub use error::{TelemetryError, TelemetryResult};
