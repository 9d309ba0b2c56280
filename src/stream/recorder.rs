//! Accumulation and single-shot span finalization shared by all wrappers.

use crate::observability::{AttributeSource, SpanHandle, SpanStatus};
use serde_json::{Map, Value};

/// Accumulates the chunks of one streamed response.
pub trait ResponseAccumulator {
    /// Chunk type delivered by the transport
    type Chunk;

    /// Merges one chunk into the accumulated state.
    fn process_chunk(&mut self, chunk: &Self::Chunk);

    /// Snapshot of the accumulated state, or `None` before the first chunk.
    fn result(&self) -> Option<Map<String, Value>>;

    /// Attribute extractor reading the accumulated state.
    fn extractor(&self) -> Box<dyn AttributeSource + '_>;
}

/// Owns a stream's accumulator and span, and finalizes the span once.
#[derive(Debug)]
pub struct StreamRecorder<A, H> {
    accumulator: A,
    span: H,
    finished: bool,
}

impl<A, H> StreamRecorder<A, H>
where
    A: ResponseAccumulator,
    H: SpanHandle,
{
    /// Creates a recorder for a new stream.
    pub fn new(accumulator: A, span: H) -> Self {
        Self {
            accumulator,
            span,
            finished: false,
        }
    }

    /// Feeds one chunk to the accumulator.
    pub fn record_chunk(&mut self, chunk: &A::Chunk) {
        self.accumulator.process_chunk(chunk);
    }

    /// Finalizes the span with a success status.
    pub fn complete(&mut self) {
        self.finish(SpanStatus::Ok);
    }

    /// Records `error` on the span and finalizes it with an error status
    /// of the form `"<ErrorType>: <message>"`.
    pub fn fail<E>(&mut self, error: &E)
    where
        E: std::error::Error,
    {
        if self.finished {
            return;
        }
        let error_type = error_type_name::<E>();
        self.span.record_exception(error_type, error);
        let description = format!("{}: {}", error_type, error);
        self.finish(SpanStatus::Error(description));
    }

    /// Returns true once the span has been finalized.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The accumulated state.
    pub fn accumulator(&self) -> &A {
        &self.accumulator
    }

    /// The span handle.
    pub fn span(&self) -> &H {
        &self.span
    }

    fn finish(&mut self, status: SpanStatus) {
        if self.finished {
            return;
        }
        self.finished = true;
        tracing::debug!(status = ?status, "Finalizing stream telemetry");
        let extractor = self.accumulator.extractor();
        self.span.finish(status, extractor.as_ref());
    }
}

/// Unqualified type name of `E`, without generic arguments.
fn error_type_name<E>() -> &'static str {
    let full = std::any::type_name::<E>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Wrapper<T>(T);

    #[test]
    fn test_error_type_name() {
        assert_eq!(error_type_name::<std::io::Error>(), "Error");
        assert_eq!(error_type_name::<std::fmt::Error>(), "Error");
        assert_eq!(error_type_name::<Wrapper<std::io::Error>>(), "Wrapper");
        assert_eq!(error_type_name::<u32>(), "u32");
    }
}
