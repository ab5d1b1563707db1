//! Observability entry and exit stages.

use super::Tracer;
use crate::config::{LogLevel, ObservabilityConfig};
use crate::context::keys::{OBSERVED, START_TIME};
use crate::context::{ExecutionContext, StartTime};
use crate::core::{Payload, StageOutput};
use crate::observability::Span;
use crate::stages::Stage;
use crate::utils::{format_timestamp, iso_timestamp};
use async_trait::async_trait;
use std::fmt::{self, Debug};
use std::sync::Arc;
use std::time::Duration;
use tracing::{event, field, info, Level};

macro_rules! event_at {
    ($level:expr, $($fields:tt)+) => {
        match $level {
            LogLevel::Trace => event!(Level::TRACE, $($fields)+),
            LogLevel::Debug => event!(Level::DEBUG, $($fields)+),
            LogLevel::Info => event!(Level::INFO, $($fields)+),
            LogLevel::Warn => event!(Level::WARN, $($fields)+),
            LogLevel::Error => event!(Level::ERROR, $($fields)+),
        }
    };
}

/// Finishes the span when the entry stage's invocation ends.
struct FinishOnDrop(Arc<dyn Span>);

impl Drop for FinishOnDrop {
    fn drop(&mut self) {
        self.0.finish();
    }
}

/// Entry stage: starts a span, records the start time and logs the request.
///
/// Meant to be the first stage of a pipeline, paired with
/// [`ObservabilityComplete`] as the last. It never fails and never changes
/// the value.
///
/// Context written:
/// - the span (see [`ExecutionContext::span`])
/// - the start time (see [`ExecutionContext::start_time`])
/// - `observed = true` and `start_time = <RFC 3339>` in the open bag
pub struct Observability {
    config: ObservabilityConfig,
    tracer: Arc<dyn Tracer>,
}

impl Observability {
    /// Creates the stage with the default configuration.
    #[must_use]
    pub fn new(tracer: Arc<dyn Tracer>) -> Self {
        Self::with_config(ObservabilityConfig::default(), tracer)
    }

    /// Creates the stage with a custom configuration.
    #[must_use]
    pub fn with_config(config: ObservabilityConfig, tracer: Arc<dyn Tracer>) -> Self {
        Self { config, tracer }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ObservabilityConfig {
        &self.config
    }
}

impl Debug for Observability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observability")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<T> Stage<T> for Observability
where
    T: Payload + Debug + Send + 'static,
{
    async fn call(&self, ctx: ExecutionContext, input: T) -> StageOutput<T> {
        let start = StartTime::now();
        let started_at = format_timestamp(&start.at);

        let span = self.tracer.start_span(&self.config.span_name);
        let _finish = FinishOnDrop(Arc::clone(&span));

        let request_id = ctx.request_id();
        let pipeline_name = ctx.pipeline_name();
        if let Some(id) = request_id {
            span.set_tag("request.id", id.into());
        }
        if let Some(name) = pipeline_name {
            span.set_tag("pipeline.name", name.into());
        }

        if self.config.log_input {
            span.set_tag("input.type", input.kind().as_str().into());
        }
        let logged_input = self.config.log_input.then(|| field::debug(&input));

        event_at!(
            self.config.log_level,
            timestamp = %started_at,
            request_id,
            pipeline_name,
            input = logged_input,
            "Request started"
        );

        let ctx = ctx
            .with_span(span)
            .with_start_time(start)
            .with_metadata(OBSERVED, true)
            .with_metadata(START_TIME, started_at);

        StageOutput::ok(ctx, input)
    }
}

/// Exit stage: logs completion and tags the span with duration and output
/// kind.
///
/// The duration is measured from the start time recorded by [`Observability`],
/// or zero when no entry stage ran.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObservabilityComplete;

impl ObservabilityComplete {
    /// Creates the stage.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl<T> Stage<T> for ObservabilityComplete
where
    T: Payload + Debug + Send + 'static,
{
    async fn call(&self, ctx: ExecutionContext, input: T) -> StageOutput<T> {
        let duration = ctx.start_time().map_or(Duration::ZERO, StartTime::elapsed);
        let duration_ms = duration.as_secs_f64() * 1000.0;

        info!(
            duration_ms,
            completed_at = %iso_timestamp(),
            request_id = ctx.request_id(),
            pipeline_name = ctx.pipeline_name(),
            output = ?input,
            "Request completed"
        );

        if let Some(span) = ctx.span() {
            span.set_tag("duration.ms", duration_ms.into());
            span.set_tag("output.type", input.kind().as_str().into());
        }

        StageOutput::ok(ctx, input)
    }
}
