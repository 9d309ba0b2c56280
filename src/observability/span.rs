//! Span handles finalized by instrumented streams.

use super::attributes::{Attribute, AttributeSource};
use super::logging::log_error;
use super::tracing::{RequestSpan, SpanStatus, Tracer};
use crate::config::TraceConfig;
use crate::errors::TelemetryResult;
use std::sync::Arc;

/// Handle to the span an instrumented stream reports to.
///
/// A stream calls `record_exception` at most once and `finish` exactly once
/// (unless it is abandoned before exhaustion).
pub trait SpanHandle {
    /// Records an error raised by the transport, along with the name of its
    /// type.
    fn record_exception(&mut self, error_type: &str, error: &dyn std::error::Error);

    /// Writes the attributes produced by `source`, sets `status` and ends the
    /// span.
    fn finish(&mut self, status: SpanStatus, source: &dyn AttributeSource);
}

/// Default [`SpanHandle`]: owns a [`RequestSpan`] and hands it to a
/// [`Tracer`] when finished.
///
/// Attribute extraction failures are logged and never escape `finish`, so a
/// broken extractor cannot change what the stream's caller observes. Every
/// attribute passes through [`TraceConfig::mask`] before it is written.
pub struct WithSpan {
    span: Option<RequestSpan>,
    tracer: Arc<dyn Tracer>,
    config: TraceConfig,
}

impl WithSpan {
    /// Wraps a started span.
    pub fn new(span: RequestSpan, tracer: Arc<dyn Tracer>, config: TraceConfig) -> Self {
        Self {
            span: Some(span),
            tracer,
            config,
        }
    }

    /// Returns the span while it is still open.
    pub fn span(&self) -> Option<&RequestSpan> {
        self.span.as_ref()
    }

    /// Returns true once the span has been handed to the tracer.
    pub fn is_finished(&self) -> bool {
        self.span.is_none()
    }
}

impl SpanHandle for WithSpan {
    fn record_exception(&mut self, error_type: &str, error: &dyn std::error::Error) {
        match self.span.as_mut() {
            Some(span) => span.record_exception(error_type, error),
            None => tracing::debug!(error = %error, "Exception recorded after span finished"),
        }
    }

    fn finish(&mut self, status: SpanStatus, source: &dyn AttributeSource) {
        let Some(mut span) = self.span.take() else {
            tracing::debug!("Span already finished");
            return;
        };

        let attributes = collect(source.attributes(), "Failed to get attributes");
        let extra_attributes = collect(source.extra_attributes(), "Failed to get extra attributes");
        for (key, value) in attributes.into_iter().chain(extra_attributes) {
            if let Some(value) = self.config.mask(&key, value) {
                span.set_attribute(key, value);
            }
        }

        self.tracer.end_span(span.finish_with_status(status));
    }
}

fn collect(result: TelemetryResult<Vec<Attribute>>, context: &str) -> Vec<Attribute> {
    result.unwrap_or_else(|error| {
        log_error(&error, context);
        Vec::new()
    })
}
