//! Instrumented streams.
//!
//! A wrapped stream forwards every chunk to a [`ResponseAccumulator`], yields
//! the chunk unchanged, and finalizes its span exactly once: with
//! [`SpanStatus::Ok`](crate::observability::SpanStatus::Ok) on exhaustion or
//! with an error status when the transport fails.
//!
//! Two response shapes are supported:
//!
//! - [`CompletionAccumulator`] / [`CompletionExtractor`] for text completion
//!   chunks ([`Completion`](crate::types::Completion))
//! - [`MessageAccumulator`] / [`MessageExtractor`] for Messages API events
//!   ([`MessageStreamEvent`](crate::types::MessageStreamEvent))

mod completion;
mod instrumented;
mod messages;
mod recorder;


pub use completion::{CompletionAccumulator, CompletionExtractor};
pub use instrumented::{
    CompletionIter, CompletionStream, InstrumentedIter, InstrumentedStream, MessagesIter,
    MessagesStream,
};
pub use messages::{MessageAccumulator, MessageExtractor};
pub use recorder::{ResponseAccumulator, StreamRecorder};
