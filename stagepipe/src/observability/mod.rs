//! Span backend seam and the observability entry/exit stages.

mod stages;
mod tracer;

pub use stages::{Observability, ObservabilityComplete};
#[cfg(test)]
pub use tracer::MockTracer;
pub use tracer::{LoggingTracer, NoopSpan, NoopTracer, Span, TagValue, Tracer};
