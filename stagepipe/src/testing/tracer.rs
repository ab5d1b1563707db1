//! In-memory tracer for asserting on span activity.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::observability::{Span, TagValue, Tracer};

/// A tracer that keeps every span it starts.
#[derive(Debug, Default)]
pub struct RecordingTracer {
    spans: Mutex<Vec<Arc<RecordedSpan>>>,
}

impl RecordingTracer {
    /// Creates a new recording tracer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the spans started so far, oldest first.
    #[must_use]
    pub fn spans(&self) -> Vec<Arc<RecordedSpan>> {
        self.spans.lock().clone()
    }
}

impl Tracer for RecordingTracer {
    fn start_span(&self, name: &str) -> Arc<dyn Span> {
        let span = Arc::new(RecordedSpan {
            name: name.to_string(),
            tags: Mutex::new(BTreeMap::new()),
            finish_calls: AtomicUsize::new(0),
        });
        self.spans.lock().push(Arc::clone(&span));
        span
    }
}

/// A span captured by [`RecordingTracer`].
#[derive(Debug)]
pub struct RecordedSpan {
    name: String,
    tags: Mutex<BTreeMap<String, TagValue>>,
    finish_calls: AtomicUsize,
}

impl RecordedSpan {
    /// Returns the operation name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a tag value.
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<TagValue> {
        self.tags.lock().get(key).cloned()
    }

    /// Returns all tags.
    #[must_use]
    pub fn tags(&self) -> BTreeMap<String, TagValue> {
        self.tags.lock().clone()
    }

    /// Returns true once `finish` has been called.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finish_count() > 0
    }

    /// Returns how many times `finish` was called.
    #[must_use]
    pub fn finish_count(&self) -> usize {
        self.finish_calls.load(Ordering::SeqCst)
    }
}

impl Span for RecordedSpan {
    fn set_tag(&self, key: &str, value: TagValue) {
        self.tags.lock().insert(key.to_string(), value);
    }

    fn finish(&self) {
        self.finish_calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_records_spans_and_tags() {
        let tracer = RecordingTracer::new();
        let span = tracer.start_span("op");
        span.set_tag("a", 1_i64.into());
        span.set_tag("b", "x".into());
        span.finish();

        let spans = tracer.spans();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].name(), "op");
        assert_eq!(spans[0].finish_count(), 1);
        assert_eq!(
            spans[0].tags(),
            BTreeMap::from([
                ("a".to_string(), TagValue::Int(1)),
                ("b".to_string(), TagValue::Str("x".to_string())),
            ])
        );
    }
}
