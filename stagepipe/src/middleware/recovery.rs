//! Panic containment.

use crate::context::ExecutionContext;
use crate::core::StageOutput;
use crate::errors::PipelineError;
use crate::stages::Stage;
use async_trait::async_trait;
use futures::FutureExt;
use std::any::Any;
use std::backtrace::Backtrace;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::error;

/// Stage that contains panics raised by the stage it wraps.
///
/// A panic is logged at `error` and reported as
/// [`PipelineError::Panicked`] together with the context the wrapper was
/// called with. Ordinary failures of the inner stage pass through unchanged.
/// Wrap a whole [`Pipeline`](crate::pipeline::Pipeline) to protect every stage
/// in it.
pub struct Recover<T: Send + 'static> {
    inner: Arc<dyn Stage<T>>,
}

impl<T: Send + 'static> Recover<T> {
    /// Wraps `inner`.
    pub fn new(inner: Arc<dyn Stage<T>>) -> Self {
        Self { inner }
    }
}

impl<T: Send + 'static> fmt::Debug for Recover<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recover").finish_non_exhaustive()
    }
}

#[async_trait]
impl<T: Send + 'static> Stage<T> for Recover<T> {
    async fn call(&self, ctx: ExecutionContext, input: T) -> StageOutput<T> {
        let outcome = AssertUnwindSafe(self.inner.call(ctx.clone(), input))
            .catch_unwind()
            .await;

        match outcome {
            Ok(output) => output,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                let backtrace = Backtrace::force_capture();
                error!(
                    panic = %message,
                    backtrace = %backtrace,
                    request_id = ctx.request_id(),
                    pipeline_name = ctx.pipeline_name(),
                    "Panic recovered in stage"
                );
                StageOutput::fail(ctx, PipelineError::Panicked { message })
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
