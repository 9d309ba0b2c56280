//! Span lifecycle tracking.
//!
//! A [`RequestSpan`] records one streamed request: timing, typed attributes,
//! recorded exceptions and the final status. [`Tracer`]s create spans and
//! receive them once they end.

use super::attributes::{attribute_names, AttributeValue};
use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Span for tracing a streamed request.
#[derive(Debug, Clone)]
pub struct RequestSpan {
    /// Unique identifier for the entire trace
    pub trace_id: String,
    /// Unique identifier for this span
    pub span_id: String,
    /// Optional identifier for the parent span
    pub parent_span_id: Option<String>,
    /// Name of the operation being traced
    pub operation: String,
    /// When the span started
    pub start_time: Instant,
    /// When the span ended (None if still active)
    pub end_time: Option<Instant>,
    /// Key-value attributes associated with this span
    pub attributes: Vec<(String, AttributeValue)>,
    /// Events recorded on this span, in order
    pub events: Vec<SpanEvent>,
    /// Status of the span (Ok, Error, or Unset)
    pub status: SpanStatus,
}

/// Status of a span.
#[derive(Debug, Clone, PartialEq)]
pub enum SpanStatus {
    /// Span completed successfully
    Ok,
    /// Span completed with an error
    Error(String),
    /// Status not yet determined
    Unset,
}

/// A timestamped event recorded on a span.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanEvent {
    /// Event name
    pub name: String,
    /// When the event was recorded
    pub time: Instant,
    /// Event attributes
    pub attributes: Vec<(String, AttributeValue)>,
}

impl RequestSpan {
    /// Creates a new span for the given operation.
    ///
    /// # Examples
    ///
    /// ```
    /// use integrations_stream_telemetry::observability::RequestSpan;
    ///
    /// let span = RequestSpan::new("Messages");
    /// assert_eq!(span.operation, "Messages");
    /// ```
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            trace_id: generate_trace_id(),
            span_id: generate_span_id(),
            parent_span_id: None,
            operation: operation.into(),
            start_time: Instant::now(),
            end_time: None,
            attributes: Vec::new(),
            events: Vec::new(),
            status: SpanStatus::Unset,
        }
    }

    /// Sets the parent span ID for this span.
    pub fn with_parent(mut self, parent_span_id: impl Into<String>) -> Self {
        self.parent_span_id = Some(parent_span_id.into());
        self
    }

    /// Adds a key-value attribute to this span.
    ///
    /// # Examples
    ///
    /// ```
    /// use integrations_stream_telemetry::observability::RequestSpan;
    ///
    /// let span = RequestSpan::new("Messages")
    ///     .with_attribute("llm.provider", "anthropic")
    ///     .with_attribute("llm.token_count.total", 12i64);
    /// assert_eq!(span.attributes.len(), 2);
    /// ```
    pub fn with_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        self.set_attribute(key, value);
        self
    }

    /// Sets an attribute, replacing any previous value for the same key.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, current)) => *current = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Returns the value of an attribute.
    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    /// Records an exception event on this span.
    pub fn record_exception(&mut self, error_type: &str, error: &dyn std::error::Error) {
        self.events.push(SpanEvent {
            name: attribute_names::EXCEPTION_EVENT.to_string(),
            time: Instant::now(),
            attributes: vec![
                (
                    attribute_names::EXCEPTION_TYPE.to_string(),
                    AttributeValue::from(error_type),
                ),
                (
                    attribute_names::EXCEPTION_MESSAGE.to_string(),
                    AttributeValue::String(error.to_string()),
                ),
            ],
        });
    }

    /// Marks the span as finished without changing its status.
    pub fn finish(mut self) -> Self {
        self.end_time = Some(Instant::now());
        self
    }

    /// Marks the span as finished with an error status.
    ///
    /// # Examples
    ///
    /// ```
    /// use integrations_stream_telemetry::observability::{RequestSpan, SpanStatus};
    ///
    /// let span = RequestSpan::new("Messages")
    ///     .finish_with_error("TransportError: connection reset");
    /// assert!(span.end_time.is_some());
    /// assert!(matches!(span.status, SpanStatus::Error(_)));
    /// ```
    pub fn finish_with_error(mut self, error: impl Into<String>) -> Self {
        self.end_time = Some(Instant::now());
        self.status = SpanStatus::Error(error.into());
        self
    }

    /// Marks the span as finished with a successful status.
    pub fn finish_with_ok(mut self) -> Self {
        self.end_time = Some(Instant::now());
        self.status = SpanStatus::Ok;
        self
    }

    /// Marks the span as finished with the given status.
    pub fn finish_with_status(self, status: SpanStatus) -> Self {
        match status {
            SpanStatus::Ok => self.finish_with_ok(),
            SpanStatus::Error(description) => self.finish_with_error(description),
            SpanStatus::Unset => self.finish(),
        }
    }

    /// Returns the duration of this span, if it has finished.
    pub fn duration(&self) -> Option<Duration> {
        self.end_time.map(|end| end.duration_since(self.start_time))
    }
}

/// Tracer for creating and collecting spans.
#[cfg_attr(test, mockall::automock)]
pub trait Tracer: Send + Sync {
    /// Starts a new span for the given operation.
    fn start_span(&self, operation: &str) -> RequestSpan;

    /// Records a completed span.
    fn end_span(&self, span: RequestSpan);
}

/// Default tracer that logs spans using the `tracing` crate.
pub struct DefaultTracer {
    service_name: String,
}

impl DefaultTracer {
    /// Creates a new default tracer with the given service name.
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }
}

impl Tracer for DefaultTracer {
    fn start_span(&self, operation: &str) -> RequestSpan {
        let span = RequestSpan::new(operation).with_attribute("service.name", self.service_name.as_str());
        tracing::debug!(
            trace_id = %span.trace_id,
            span_id = %span.span_id,
            operation = %operation,
            "Span started"
        );
        span
    }

    fn end_span(&self, span: RequestSpan) {
        let span = if span.end_time.is_some() { span } else { span.finish() };
        let duration_ms = span.duration().map(|d| d.as_millis()).unwrap_or(0);
        tracing::debug!(
            trace_id = %span.trace_id,
            span_id = %span.span_id,
            operation = %span.operation,
            duration_ms = duration_ms,
            attributes = span.attributes.len(),
            exceptions = span.events.len(),
            status = ?span.status,
            "Span ended"
        );
    }
}

/// No-op tracer for when tracing is disabled.
pub struct NoopTracer;

impl Tracer for NoopTracer {
    fn start_span(&self, operation: &str) -> RequestSpan {
        RequestSpan::new(operation)
    }

    fn end_span(&self, _span: RequestSpan) {}
}

/// Tracer that keeps finished spans in memory.
///
/// Useful for tests and for exporting spans in batches.
#[derive(Default)]
pub struct InMemoryTracer {
    finished: Mutex<Vec<RequestSpan>>,
}

impl InMemoryTracer {
    /// Creates an empty in-memory tracer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every finished span, in completion order.
    pub fn finished_spans(&self) -> Vec<RequestSpan> {
        self.finished.lock().clone()
    }

    /// Removes and returns every finished span.
    pub fn take_finished_spans(&self) -> Vec<RequestSpan> {
        std::mem::take(&mut *self.finished.lock())
    }
}

impl Tracer for InMemoryTracer {
    fn start_span(&self, operation: &str) -> RequestSpan {
        RequestSpan::new(operation)
    }

    fn end_span(&self, span: RequestSpan) {
        self.finished.lock().push(span);
    }
}

fn nanos_since_epoch() -> u128 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default()
}

/// Generates a 32-character hexadecimal trace ID.
fn generate_trace_id() -> String {
    format!("{:032x}", nanos_since_epoch())
}

/// Generates a 16-character hexadecimal span ID.
fn generate_span_id() -> String {
    format!("{:016x}", nanos_since_epoch() & 0xFFFF_FFFF_FFFF_FFFF)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_span_creation() {
        let span = RequestSpan::new("Completions");
        assert_eq!(span.operation, "Completions");
        assert_eq!(span.status, SpanStatus::Unset);
        assert!(span.end_time.is_none());
        assert!(span.parent_span_id.is_none());
        assert!(span.events.is_empty());
        assert_eq!(span.trace_id.len(), 32);
        assert_eq!(span.span_id.len(), 16);
    }

    #[test]
    fn test_span_with_parent() {
        let parent = RequestSpan::new("parent");
        let child = RequestSpan::new("child").with_parent(parent.span_id.clone());
        assert_eq!(child.parent_span_id, Some(parent.span_id));
    }

    #[test]
    fn test_set_attribute_replaces_existing_key() {
        let mut span = RequestSpan::new("test").with_attribute("key", "first");
        span.set_attribute("key", "second");
        span.set_attribute("other", 3i64);
        assert_eq!(span.attributes.len(), 2);
        assert_eq!(span.attribute("key"), Some(&AttributeValue::from("second")));
        assert_eq!(span.attribute("other"), Some(&AttributeValue::Int(3)));
        assert_eq!(span.attribute("missing"), None);
    }

    #[test]
    fn test_record_exception() {
        let mut span = RequestSpan::new("test");
        let error = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        span.record_exception("Error", &error);

        assert_eq!(span.events.len(), 1);
        assert_eq!(span.events[0].name, "exception");
        assert_eq!(
            span.events[0].attributes,
            vec![
                ("exception.type".to_string(), AttributeValue::from("Error")),
                (
                    "exception.message".to_string(),
                    AttributeValue::from("reset by peer")
                ),
            ]
        );
    }

    #[test]
    fn test_finish_with_status() {
        let span = RequestSpan::new("test").finish_with_status(SpanStatus::Ok);
        assert_eq!(span.status, SpanStatus::Ok);
        assert!(span.end_time.is_some());

        let span = RequestSpan::new("test").finish_with_status(SpanStatus::Error("boom".into()));
        assert_eq!(span.status, SpanStatus::Error("boom".to_string()));

        let span = RequestSpan::new("test").finish_with_status(SpanStatus::Unset);
        assert_eq!(span.status, SpanStatus::Unset);
        assert!(span.end_time.is_some());
    }

    #[test]
    fn test_span_duration() {
        let span = RequestSpan::new("test");
        assert!(span.duration().is_none());

        thread::sleep(Duration::from_millis(10));
        let span = span.finish();

        let duration = span.duration().unwrap();
        assert!(duration >= Duration::from_millis(10));
    }

    #[test]
    fn test_default_tracer_start_span() {
        let tracer = DefaultTracer::new("test-service");
        let span = tracer.start_span("Messages");
        assert_eq!(span.operation, "Messages");
        assert_eq!(
            span.attribute("service.name"),
            Some(&AttributeValue::from("test-service"))
        );
        tracer.end_span(span);
    }

    #[test]
    fn test_noop_tracer() {
        let tracer = NoopTracer;
        let span = tracer.start_span("Messages");
        assert_eq!(span.operation, "Messages");
        tracer.end_span(span);
    }

    #[test]
    fn test_in_memory_tracer_collects_spans() {
        let tracer = InMemoryTracer::new();
        tracer.end_span(tracer.start_span("first").finish_with_ok());
        tracer.end_span(tracer.start_span("second").finish_with_error("boom"));

        let spans = tracer.finished_spans();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].operation, "first");
        assert_eq!(spans[1].status, SpanStatus::Error("boom".to_string()));

        assert_eq!(tracer.take_finished_spans().len(), 2);
        assert!(tracer.finished_spans().is_empty());
    }
}
