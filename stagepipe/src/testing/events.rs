//! A `tracing` layer that keeps every event for later inspection.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// One recorded event.
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    /// The event level.
    pub level: Level,
    /// The event message.
    pub message: String,
    /// All other fields, rendered as text.
    pub fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    /// Returns a field rendered as text.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Collects events emitted while installed as the thread's default
/// subscriber.
///
/// ```rust,ignore
/// let events = EventCollector::new();
/// let _guard = events.install();
/// // ... run stages ...
/// assert_eq!(events.with_message("Request started").len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EventCollector {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl EventCollector {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the collector as the current thread's default subscriber
    /// until the guard is dropped.
    #[must_use]
    pub fn install(&self) -> DefaultGuard {
        tracing::subscriber::set_default(tracing_subscriber::registry().with(self.clone()))
    }

    /// Returns every event recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().clone()
    }

    /// Returns the events whose message equals `message`.
    #[must_use]
    pub fn with_message(&self, message: &str) -> Vec<CapturedEvent> {
        self.events
            .lock()
            .iter()
            .filter(|event| event.message == message)
            .cloned()
            .collect()
    }
}

impl<S: Subscriber> Layer<S> for EventCollector {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        self.events.lock().push(CapturedEvent {
            level: *event.metadata().level(),
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: BTreeMap<String, String>,
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, format!("{value:?}"));
    }
}

impl FieldVisitor {
    fn insert(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = value;
        } else {
            self.fields.insert(field.name().to_string(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::{info, warn};

    #[test]
    fn test_collects_level_message_and_fields() {
        let events = EventCollector::new();
        {
            let _guard = events.install();
            info!(user = "abc", count = 3, "first");
            warn!(reason = %"full", "second");
        }
        info!("not collected");

        let recorded = events.events();
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[0].level, Level::INFO);
        assert_eq!(recorded[0].message, "first");
        assert_eq!(recorded[0].field("user"), Some("abc"));
        assert_eq!(recorded[0].field("count"), Some("3"));
        assert_eq!(events.with_message("second")[0].field("reason"), Some("full"));
    }
}
