//! Entry point that starts spans and wraps response streams.
//!
//! ```
//! use futures::stream::{self, StreamExt};
//! use integrations_stream_telemetry::config::TraceConfig;
//! use integrations_stream_telemetry::instrumentor::StreamInstrumentor;
//! use integrations_stream_telemetry::observability::InMemoryTracer;
//! use integrations_stream_telemetry::types::Completion;
//! use std::sync::Arc;
//!
//! # futures::executor::block_on(async {
//! let tracer = Arc::new(InMemoryTracer::new());
//! let instrumentor = StreamInstrumentor::new(tracer.clone(), TraceConfig::default());
//!
//! let chunks = stream::iter(vec![Ok::<_, std::io::Error>(Completion::text("Hi"))]);
//! let stream = instrumentor.instrument_completions(chunks);
//! let _: Vec<_> = stream.collect().await;
//!
//! assert_eq!(tracer.finished_spans().len(), 1);
//! # });
//! ```

use crate::config::TraceConfig;
use crate::errors::TelemetryResult;
use crate::observability::{attribute_names, DefaultTracer, Tracer, WithSpan};
use crate::stream::{
    CompletionAccumulator, CompletionIter, CompletionStream, MessageAccumulator, MessagesIter,
    MessagesStream,
};
use crate::{COMPLETIONS_SPAN_NAME, LLM_PROVIDER_NAME, LLM_SPAN_KIND, MESSAGES_SPAN_NAME};
use std::sync::Arc;

/// Starts a span per streamed request and wraps the transport so the span
/// is finalized from the accumulated response.
#[derive(Clone)]
pub struct StreamInstrumentor {
    tracer: Arc<dyn Tracer>,
    config: TraceConfig,
}

impl StreamInstrumentor {
    /// Creates an instrumentor reporting to `tracer`.
    pub fn new(tracer: Arc<dyn Tracer>, config: TraceConfig) -> Self {
        Self { tracer, config }
    }

    /// Creates an instrumentor configured from environment variables,
    /// reporting through a [`DefaultTracer`].
    pub fn from_env() -> TelemetryResult<Self> {
        let config = TraceConfig::from_env()?;
        let tracer = Arc::new(DefaultTracer::new(config.service_name.clone()));
        Ok(Self::new(tracer, config))
    }

    /// The active configuration.
    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    /// Wraps a text completion stream.
    pub fn instrument_completions<S>(&self, stream: S) -> CompletionStream<S> {
        CompletionStream::new(
            stream,
            CompletionAccumulator::new(),
            self.start_span(COMPLETIONS_SPAN_NAME),
        )
    }

    /// Wraps a Messages API event stream.
    pub fn instrument_messages<S>(&self, stream: S) -> MessagesStream<S> {
        MessagesStream::new(
            stream,
            MessageAccumulator::new(),
            self.start_span(MESSAGES_SPAN_NAME),
        )
    }

    /// Wraps a blocking text completion iterator.
    pub fn instrument_completions_iter<I>(&self, iter: I) -> CompletionIter<I> {
        CompletionIter::new(
            iter,
            CompletionAccumulator::new(),
            self.start_span(COMPLETIONS_SPAN_NAME),
        )
    }

    /// Wraps a blocking Messages API event iterator.
    pub fn instrument_messages_iter<I>(&self, iter: I) -> MessagesIter<I> {
        MessagesIter::new(
            iter,
            MessageAccumulator::new(),
            self.start_span(MESSAGES_SPAN_NAME),
        )
    }

    fn start_span(&self, name: &str) -> WithSpan {
        let mut span = self.tracer.start_span(name);
        span.set_attribute(attribute_names::SPAN_KIND, LLM_SPAN_KIND);
        span.set_attribute(attribute_names::LLM_PROVIDER, LLM_PROVIDER_NAME);
        tracing::debug!(span = %name, span_id = %span.span_id, "Instrumenting stream");
        WithSpan::new(span, self.tracer.clone(), self.config.clone())
    }
}

impl std::fmt::Debug for StreamInstrumentor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamInstrumentor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::{AttributeValue, InMemoryTracer, MockTracer, RequestSpan, SpanStatus};
    use crate::types::{Completion, MessageStreamEvent, Role, StopReason};
    use futures::stream::{self, StreamExt};
    use pretty_assertions::assert_eq;

    #[derive(Debug, thiserror::Error)]
    #[error("stream closed")]
    struct Closed;

    fn instrumentor(config: TraceConfig) -> (Arc<InMemoryTracer>, StreamInstrumentor) {
        let tracer = Arc::new(InMemoryTracer::new());
        (tracer.clone(), StreamInstrumentor::new(tracer, config))
    }

    #[tokio::test]
    async fn test_completions_span_name_and_kind() {
        let (tracer, instrumentor) = instrumentor(TraceConfig::default());
        let chunks = stream::iter(vec![Ok::<_, Closed>(Completion::text("Hi"))]);
        let _: Vec<_> = instrumentor.instrument_completions(chunks).collect().await;

        let spans = tracer.take_finished_spans();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].operation, "Completions");
        assert_eq!(
            spans[0].attribute(attribute_names::SPAN_KIND),
            Some(&AttributeValue::from("LLM"))
        );
        assert_eq!(
            spans[0].attribute(attribute_names::LLM_PROVIDER),
            Some(&AttributeValue::from("anthropic"))
        );
    }

    #[tokio::test]
    async fn test_hidden_outputs_keep_token_counts() {
        let (tracer, instrumentor) =
            instrumentor(TraceConfig::builder().hide_outputs(true).build());
        let events = stream::iter(
            vec![
                MessageStreamEvent::message_start(Role::Assistant, 3),
                MessageStreamEvent::text_delta(0, "secret"),
                MessageStreamEvent::message_delta(Some(StopReason::EndTurn), 1),
            ]
            .into_iter()
            .map(Ok::<_, Closed>),
        );
        let _: Vec<_> = instrumentor.instrument_messages(events).collect().await;

        let span = &tracer.take_finished_spans()[0];
        assert_eq!(span.operation, "Messages");
        assert!(span.attribute(attribute_names::OUTPUT_VALUE).is_none());
        assert!(span
            .attributes
            .iter()
            .all(|(key, _)| !key.starts_with(attribute_names::LLM_OUTPUT_MESSAGES)));
        assert_eq!(
            span.attribute(attribute_names::LLM_TOKEN_COUNT_TOTAL),
            Some(&AttributeValue::Int(4))
        );
    }

    #[test]
    fn test_redacted_message_text() {
        let (tracer, instrumentor) =
            instrumentor(TraceConfig::builder().hide_output_text(true).build());
        let events = vec![
            Ok(MessageStreamEvent::message_start(Role::Assistant, 3)),
            Ok(MessageStreamEvent::text_delta(0, "secret")),
            Err(Closed),
        ];
        let results: Vec<_> = instrumentor
            .instrument_messages_iter(events.into_iter())
            .collect();
        assert_eq!(results.len(), 3);

        let span = &tracer.take_finished_spans()[0];
        assert_eq!(
            span.status,
            SpanStatus::Error("Closed: stream closed".to_string())
        );
        assert_eq!(
            span.attribute("llm.output_messages.0.message.content"),
            Some(&AttributeValue::from("__REDACTED__"))
        );
        assert_eq!(
            span.attribute("llm.output_messages.0.message.role"),
            Some(&AttributeValue::from("assistant"))
        );
    }

    #[test]
    fn test_each_request_starts_its_own_span() {
        let mut tracer = MockTracer::new();
        tracer
            .expect_start_span()
            .withf(|name| name.to_string() == COMPLETIONS_SPAN_NAME)
            .times(2)
            .returning(|name| RequestSpan::new(name));
        tracer.expect_end_span().times(2).return_const(());
        let instrumentor = StreamInstrumentor::new(Arc::new(tracer), TraceConfig::default());

        for _ in 0..2 {
            let chunks = vec![Ok::<_, Closed>(Completion::text("x"))];
            let count = instrumentor
                .instrument_completions_iter(chunks.into_iter())
                .count();
            assert_eq!(count, 1);
        }
    }
}
