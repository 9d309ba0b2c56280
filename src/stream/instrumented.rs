//! Stream and iterator wrappers that record what passes through them.

use super::completion::CompletionAccumulator;
use super::messages::MessageAccumulator;
use super::recorder::{ResponseAccumulator, StreamRecorder};
use crate::observability::{SpanHandle, WithSpan};
use futures::stream::{FusedStream, Stream};
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};

pin_project! {
    /// Wraps a fallible chunk stream, yielding every item unchanged while
    /// accumulating successful chunks.
    ///
    /// The span is finalized once: with an `Ok` status when the inner stream
    /// ends, or with an error status when it yields an error. After an error
    /// the wrapper yields `None`. Dropping the wrapper early leaves the span
    /// unfinished.
    pub struct InstrumentedStream<S, A, H> {
        #[pin]
        inner: S,
        recorder: StreamRecorder<A, H>,
        is_done: bool,
    }
}

impl<S, A, H> InstrumentedStream<S, A, H>
where
    A: ResponseAccumulator,
    H: SpanHandle,
{
    /// Wraps `inner`.
    pub fn new(inner: S, accumulator: A, span: H) -> Self {
        Self {
            inner,
            recorder: StreamRecorder::new(accumulator, span),
            is_done: false,
        }
    }

    /// The accumulated state so far.
    pub fn accumulator(&self) -> &A {
        self.recorder.accumulator()
    }

    /// The span handle.
    pub fn span(&self) -> &H {
        self.recorder.span()
    }

    /// Returns true once the span has been finalized.
    pub fn is_finished(&self) -> bool {
        self.recorder.is_finished()
    }
}

impl<S, A, H, E> Stream for InstrumentedStream<S, A, H>
where
    S: Stream<Item = Result<A::Chunk, E>>,
    A: ResponseAccumulator,
    H: SpanHandle,
    E: std::error::Error,
{
    type Item = Result<A::Chunk, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();

        if *this.is_done {
            return Poll::Ready(None);
        }

        match this.inner.poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                this.recorder.record_chunk(&chunk);
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => {
                *this.is_done = true;
                this.recorder.fail(&e);
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                *this.is_done = true;
                this.recorder.complete();
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.is_done {
            (0, Some(0))
        } else {
            self.inner.size_hint()
        }
    }
}

impl<S, A, H, E> FusedStream for InstrumentedStream<S, A, H>
where
    S: Stream<Item = Result<A::Chunk, E>>,
    A: ResponseAccumulator,
    H: SpanHandle,
    E: std::error::Error,
{
    fn is_terminated(&self) -> bool {
        self.is_done
    }
}

/// Blocking counterpart of [`InstrumentedStream`].
pub struct InstrumentedIter<I, A, H> {
    inner: I,
    recorder: StreamRecorder<A, H>,
    is_done: bool,
}

impl<I, A, H> InstrumentedIter<I, A, H>
where
    A: ResponseAccumulator,
    H: SpanHandle,
{
    /// Wraps `inner`.
    pub fn new(inner: I, accumulator: A, span: H) -> Self {
        Self {
            inner,
            recorder: StreamRecorder::new(accumulator, span),
            is_done: false,
        }
    }

    /// The accumulated state so far.
    pub fn accumulator(&self) -> &A {
        self.recorder.accumulator()
    }

    /// The span handle.
    pub fn span(&self) -> &H {
        self.recorder.span()
    }

    /// Returns true once the span has been finalized.
    pub fn is_finished(&self) -> bool {
        self.recorder.is_finished()
    }
}

impl<I, A, H, E> Iterator for InstrumentedIter<I, A, H>
where
    I: Iterator<Item = Result<A::Chunk, E>>,
    A: ResponseAccumulator,
    H: SpanHandle,
    E: std::error::Error,
{
    type Item = Result<A::Chunk, E>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_done {
            return None;
        }

        match self.inner.next() {
            Some(Ok(chunk)) => {
                self.recorder.record_chunk(&chunk);
                Some(Ok(chunk))
            }
            Some(Err(e)) => {
                self.is_done = true;
                self.recorder.fail(&e);
                Some(Err(e))
            }
            None => {
                self.is_done = true;
                self.recorder.complete();
                None
            }
        }
    }
}

impl<I, A, H, E> std::iter::FusedIterator for InstrumentedIter<I, A, H>
where
    I: Iterator<Item = Result<A::Chunk, E>>,
    A: ResponseAccumulator,
    H: SpanHandle,
    E: std::error::Error,
{
}

/// Instrumented text completion stream
pub type CompletionStream<S, H = WithSpan> = InstrumentedStream<S, CompletionAccumulator, H>;
/// Instrumented Messages API event stream
pub type MessagesStream<S, H = WithSpan> = InstrumentedStream<S, MessageAccumulator, H>;
/// Instrumented blocking text completion iterator
pub type CompletionIter<I, H = WithSpan> = InstrumentedIter<I, CompletionAccumulator, H>;
/// Instrumented blocking Messages API event iterator
pub type MessagesIter<I, H = WithSpan> = InstrumentedIter<I, MessageAccumulator, H>;
