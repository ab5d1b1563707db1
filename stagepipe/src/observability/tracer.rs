//! Span backend seam used by the observability stages.
//!
//! Stagepipe does not implement a distributed-tracing protocol. It talks to
//! whatever backend the host wires in through [`Tracer`] and [`Span`].

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// A tag value attached to a span.
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    /// A string tag.
    Str(String),
    /// An integer tag.
    Int(i64),
    /// A floating point tag.
    Float(f64),
    /// A boolean tag.
    Bool(bool),
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(v) => f.write_str(v),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for TagValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for TagValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for TagValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for TagValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// An active span on the host's tracing backend.
pub trait Span: Send + Sync {
    /// Attaches a tag.
    fn set_tag(&self, key: &str, value: TagValue);

    /// Finishes the span. Calling it more than once has no further effect.
    fn finish(&self);
}

/// Starts spans on the host's tracing backend.
#[cfg_attr(test, mockall::automock)]
pub trait Tracer: Send + Sync {
    /// Starts a span with the given operation name.
    fn start_span(&self, name: &str) -> Arc<dyn Span>;
}

/// A span that records nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSpan;

impl Span for NoopSpan {
    fn set_tag(&self, _key: &str, _value: TagValue) {}
    fn finish(&self) {}
}

/// No-op tracer.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

impl Tracer for NoopTracer {
    fn start_span(&self, _name: &str) -> Arc<dyn Span> {
        Arc::new(NoopSpan)
    }
}

/// Logging-based tracer: span lifecycle is reported through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingTracer;

impl Tracer for LoggingTracer {
    fn start_span(&self, name: &str) -> Arc<dyn Span> {
        tracing::info!(span_name = name, "Span started");
        Arc::new(LoggingSpan {
            name: name.to_string(),
            started: Instant::now(),
            tags: Mutex::new(BTreeMap::new()),
            finished: AtomicBool::new(false),
        })
    }
}

#[derive(Debug)]
struct LoggingSpan {
    name: String,
    started: Instant,
    tags: Mutex<BTreeMap<String, TagValue>>,
    finished: AtomicBool,
}

impl Span for LoggingSpan {
    fn set_tag(&self, key: &str, value: TagValue) {
        self.tags.lock().insert(key.to_string(), value);
    }

    fn finish(&self) {
        if self.finished.swap(true, Ordering::SeqCst) {
            return;
        }
        let duration_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        let tags = self.tags.lock().clone();
        tracing::info!(
            span_name = %self.name,
            duration_ms,
            tags = ?tags,
            "Span finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_value_conversions() {
        assert_eq!(TagValue::from("a"), TagValue::Str("a".to_string()));
        assert_eq!(TagValue::from(3_i64), TagValue::Int(3));
        assert_eq!(TagValue::from(1.5_f64), TagValue::Float(1.5));
        assert_eq!(TagValue::from(true).to_string(), "true");
    }

    #[test]
    fn test_noop_tracer() {
        let span = NoopTracer.start_span("test");
        span.set_tag("k", TagValue::from("v"));
        span.finish();
        span.finish();
    }

    #[test]
    fn test_logging_span_finishes_once() {
        let span = LoggingTracer.start_span("middleware.request");
        span.set_tag("request.id", "abc".into());
        span.finish();
        span.finish();
    }

    #[test]
    fn test_mock_tracer() {
        let mut tracer = MockTracer::new();
        tracer
            .expect_start_span()
            .times(1)
            .returning(|_| Arc::new(NoopSpan));

        let span = tracer.start_span("x");
        span.finish();
    }
}
