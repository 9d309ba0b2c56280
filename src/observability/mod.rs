//! Observability module: spans, attributes and logging.
//!
//! - **Attributes**: typed span attribute values, attribute names and the
//!   [`AttributeSource`] trait implemented by response extractors
//! - **Tracing**: spans, tracers and the [`SpanHandle`] a wrapped stream
//!   finalizes exactly once
//! - **Logging**: structured logging setup on top of `tracing-subscriber`
//!
//! ## Examples
//!
//! ```rust,no_run
//! use integrations_stream_telemetry::observability::{
//!     DefaultTracer, Tracer, LoggingConfig, LogLevel, LogFormat,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! LoggingConfig::new()
//!     .with_level(LogLevel::Debug)
//!     .with_format(LogFormat::Json)
//!     .init()?;
//!
//! let tracer = DefaultTracer::new("my-service");
//! let span = tracer.start_span("Messages");
//! tracer.end_span(span.finish_with_ok());
//! # Ok(())
//! # }
//! ```

mod attributes;
mod logging;
mod span;
mod tracing;


pub use self::attributes::*;
pub use self::logging::*;
pub use self::span::*;
pub use self::tracing::*;
