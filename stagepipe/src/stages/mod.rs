//! Stage trait and implementations.
//!
//! Stages are the fundamental units of work in a stagepipe pipeline. A stage
//! receives the running context and value and hands back a new context along
//! with either a value or a failure.

use crate::context::ExecutionContext;
use crate::core::StageOutput;
use async_trait::async_trait;
use std::fmt::{self, Debug};
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

/// Trait for pipeline stages.
///
/// Stages must be safe to invoke from several runs at once; any private
/// mutable state they own is their own responsibility to synchronize.
#[async_trait]
pub trait Stage<T: Send + 'static>: Send + Sync {
    /// Invokes the stage.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The running context
    /// * `input` - The running value
    async fn call(&self, ctx: ExecutionContext, input: T) -> StageOutput<T>;
}

#[async_trait]
impl<T, S> Stage<T> for Arc<S>
where
    T: Send + 'static,
    S: Stage<T> + ?Sized,
{
    async fn call(&self, ctx: ExecutionContext, input: T) -> StageOutput<T> {
        (**self).call(ctx, input).await
    }
}

/// A simple function-based stage.
pub struct FnStage<F> {
    func: F,
}

impl<F> FnStage<F> {
    /// Creates a new function-based stage.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> Debug for FnStage<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnStage").finish_non_exhaustive()
    }
}

#[async_trait]
impl<T, F> Stage<T> for FnStage<F>
where
    T: Send + 'static,
    F: Fn(ExecutionContext, T) -> StageOutput<T> + Send + Sync,
{
    async fn call(&self, ctx: ExecutionContext, input: T) -> StageOutput<T> {
        (self.func)(ctx, input)
    }
}

/// An async function-based stage.
pub struct AsyncFnStage<F, Fut> {
    func: F,
    _phantom: PhantomData<fn() -> Fut>,
}

impl<F, Fut> AsyncFnStage<F, Fut> {
    /// Creates a new async function-based stage.
    pub fn new(func: F) -> Self {
        Self {
            func,
            _phantom: PhantomData,
        }
    }
}

impl<F, Fut> Debug for AsyncFnStage<F, Fut> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncFnStage").finish_non_exhaustive()
    }
}

#[async_trait]
impl<T, F, Fut> Stage<T> for AsyncFnStage<F, Fut>
where
    T: Send + 'static,
    F: Fn(ExecutionContext, T) -> Fut + Send + Sync,
    Fut: Future<Output = StageOutput<T>> + Send,
{
    async fn call(&self, ctx: ExecutionContext, input: T) -> StageOutput<T> {
        (self.func)(ctx, input).await
    }
}

/// Wraps a synchronous closure as a shareable stage.
pub fn from_fn<T, F>(func: F) -> Arc<dyn Stage<T>>
where
    T: Send + 'static,
    F: Fn(ExecutionContext, T) -> StageOutput<T> + Send + Sync + 'static,
{
    Arc::new(FnStage::new(func))
}

/// Wraps a closure returning a future as a shareable stage.
pub fn from_async_fn<T, F, Fut>(func: F) -> Arc<dyn Stage<T>>
where
    T: Send + 'static,
    F: Fn(ExecutionContext, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = StageOutput<T>> + Send + 'static,
{
    Arc::new(AsyncFnStage::new(func))
}

/// A stage that passes its input through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

#[async_trait]
impl<T: Send + 'static> Stage<T> for Identity {
    async fn call(&self, ctx: ExecutionContext, input: T) -> StageOutput<T> {
        StageOutput::ok(ctx, input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PipelineError;

    #[tokio::test]
    async fn test_fn_stage() {
        let stage = FnStage::new(|ctx: ExecutionContext, input: i32| {
            StageOutput::ok(ctx.with_metadata("seen", true), input + 1)
        });

        let output = stage.call(ExecutionContext::new(), 1).await;
        assert_eq!(output.value(), Some(&2));
        assert_eq!(output.context.metadata_bool("seen"), Some(true));
    }

    #[tokio::test]
    async fn test_async_fn_stage() {
        let stage = from_async_fn(|ctx, input: String| async move {
            tokio::task::yield_now().await;
            StageOutput::ok(ctx, input.to_uppercase())
        });

        let output = stage.call(ExecutionContext::new(), "abc".to_string()).await;
        assert_eq!(output.into_result().unwrap(), "ABC");
    }

    #[tokio::test]
    async fn test_fn_stage_failure() {
        let stage = from_fn(|ctx, _input: i32| StageOutput::fail(ctx, PipelineError::msg("nope")));
        let output = stage.call(ExecutionContext::new(), 0).await;
        assert_eq!(output.error().unwrap().to_string(), "nope");
    }

    #[tokio::test]
    async fn test_identity_stage() {
        let output = Identity.call(ExecutionContext::new(), vec![1_u8, 2]).await;
        assert_eq!(output.into_result().unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_arc_stage_delegates() {
        let stage: Arc<dyn Stage<i32>> = Arc::new(Identity);
        let shared = Arc::new(stage);
        let output = shared.call(ExecutionContext::new(), 9).await;
        assert_eq!(output.value(), Some(&9));
    }
}
