//! # Stream Telemetry
//!
//! Span telemetry for streamed LLM responses.
//!
//! A streamed response arrives as many small chunks. This crate wraps the
//! transport, passes every chunk through unchanged, folds the chunks into a
//! single accumulated response and, when the stream ends, writes that
//! response onto a span as attributes.
//!
//! ## Features
//!
//! - Accumulators for append-only text, last-value fields, index-keyed
//!   children and nested composites
//! - Text completion and Messages API event support
//! - Async (`futures::Stream`) and blocking (`Iterator`) transports
//! - Output masking and redaction via [`TraceConfig`]
//! - Structured logging through `tracing`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use integrations_stream_telemetry::{StreamInstrumentor, types::MessageStreamEvent};
//!
//! # async fn run(
//! #     events: impl futures::Stream<Item = Result<MessageStreamEvent, std::io::Error>> + Unpin,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let instrumentor = StreamInstrumentor::from_env()?;
//! let mut stream = instrumentor.instrument_messages(events);
//!
//! while let Some(event) = stream.next().await {
//!     println!("{:?}", event?);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - `accumulator` - Incremental accumulation of partial updates
//! - `stream` - Response accumulators, extractors and stream wrappers
//! - `instrumentor` - Span creation and stream wrapping
//! - `observability` - Spans, tracers, attributes and logging
//! - `config` - Masking configuration
//! - `errors` - Error types
//! - `types` - Streamed chunk types

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod accumulator;
pub mod config;
pub mod errors;
pub mod instrumentor;
pub mod observability;
pub mod stream;
pub mod types;

pub use accumulator::{
    IndexedAccumulator, ScalarReplace, Slot, StringAccumulator, ValuesAccumulator,
};
pub use config::{TraceConfig, TraceConfigBuilder};
pub use errors::{TelemetryError, TelemetryResult};
pub use instrumentor::StreamInstrumentor;
pub use observability::{
    AttributeSource, AttributeValue, DefaultTracer, InMemoryTracer, LogFormat, LogLevel,
    LoggingConfig, NoopTracer, RequestSpan, SpanHandle, SpanStatus, Tracer, WithSpan,
};
pub use stream::{
    CompletionAccumulator, CompletionExtractor, CompletionIter, CompletionStream,
    InstrumentedIter, InstrumentedStream, MessageAccumulator, MessageExtractor, MessagesIter,
    MessagesStream, ResponseAccumulator,
};

/// Service name used when none is configured
pub const DEFAULT_SERVICE_NAME: &str = "stream-telemetry";

/// Value written in place of redacted output text
pub const REDACTED_VALUE: &str = "__REDACTED__";

/// Span name for text completion requests
pub const COMPLETIONS_SPAN_NAME: &str = "Completions";

/// Span name for Messages API requests
pub const MESSAGES_SPAN_NAME: &str = "Messages";

/// Span kind recorded on every instrumented span
pub const LLM_SPAN_KIND: &str = "LLM";

/// Provider recorded on every instrumented span
pub const LLM_PROVIDER_NAME: &str = "anthropic";
