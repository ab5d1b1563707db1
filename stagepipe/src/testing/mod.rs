//! Testing utilities for stagepipe pipelines.
//!
//! This module provides:
//! - Mock stages that count, record, fail, panic or sleep
//! - A recording [`Tracer`](crate::observability::Tracer)
//! - A `tracing` layer that captures log events
//! - Assertions for stage outputs

mod assertions;
mod events;
mod mocks;
mod tracer;

pub use assertions::{
    assert_failed_at_stage, assert_metadata, assert_output_failed, assert_output_succeeded,
};
pub use events::{CapturedEvent, EventCollector};
pub use mocks::{
    CountingStage, FailingStage, PanickingStage, RecordedExecution, RecordingStage, SlowStage,
    TaggingStage,
};
pub use tracer::{RecordedSpan, RecordingTracer};
