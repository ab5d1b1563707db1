//! Conditional gating.

use crate::context::keys::CONDITIONAL_SKIPPED;
use crate::context::ExecutionContext;
use crate::core::StageOutput;
use crate::stages::Stage;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Stage that runs `inner` only when a predicate holds.
///
/// When the predicate is false, `inner` is not invoked at all; the input passes
/// through and `conditional_skipped = true` is recorded in the metadata bag.
pub struct Conditional<T: Send + 'static, P> {
    predicate: P,
    inner: Arc<dyn Stage<T>>,
}

impl<T, P> Conditional<T, P>
where
    T: Send + 'static,
    P: Fn(&ExecutionContext, &T) -> bool + Send + Sync,
{
    /// Creates the stage.
    pub fn new(predicate: P, inner: Arc<dyn Stage<T>>) -> Self {
        Self { predicate, inner }
    }
}

impl<T: Send + 'static, P> fmt::Debug for Conditional<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conditional").finish_non_exhaustive()
    }
}

#[async_trait]
impl<T, P> Stage<T> for Conditional<T, P>
where
    T: Send + 'static,
    P: Fn(&ExecutionContext, &T) -> bool + Send + Sync,
{
    async fn call(&self, ctx: ExecutionContext, input: T) -> StageOutput<T> {
        let run = (self.predicate)(&ctx, &input);
        if !run {
            return StageOutput::ok(ctx.with_metadata(CONDITIONAL_SKIPPED, true), input);
        }
        self.inner.call(ctx, input).await
    }
}
