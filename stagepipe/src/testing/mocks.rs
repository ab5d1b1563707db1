//! Mock stages for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::context::ExecutionContext;
use crate::core::StageOutput;
use crate::errors::PipelineError;
use crate::stages::Stage;

/// A pass-through stage that counts its invocations.
#[derive(Debug, Default)]
pub struct CountingStage {
    calls: AtomicUsize,
}

impl CountingStage {
    /// Creates a new counting stage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of times the stage was called.
    #[must_use]
    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Resets the counter.
    pub fn reset(&self) {
        self.calls.store(0, Ordering::SeqCst);
    }
}

#[async_trait]
impl<T: Send + 'static> Stage<T> for CountingStage {
    async fn call(&self, ctx: ExecutionContext, input: T) -> StageOutput<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        StageOutput::ok(ctx, input)
    }
}

/// A stage that always fails with the given message.
#[derive(Debug)]
pub struct FailingStage {
    message: String,
}

impl FailingStage {
    /// Creates a new failing stage.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl<T: Send + 'static> Stage<T> for FailingStage {
    async fn call(&self, ctx: ExecutionContext, _input: T) -> StageOutput<T> {
        StageOutput::fail(ctx, PipelineError::msg(self.message.clone()))
    }
}

/// A stage that panics with the given message.
#[derive(Debug)]
pub struct PanickingStage {
    message: String,
}

impl PanickingStage {
    /// Creates a new panicking stage.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl<T: Send + 'static> Stage<T> for PanickingStage {
    async fn call(&self, _ctx: ExecutionContext, _input: T) -> StageOutput<T> {
        panic!("{}", self.message)
    }
}

/// A stage that takes time to execute.
#[derive(Debug)]
pub struct SlowStage {
    delay: Duration,
}

impl SlowStage {
    /// Creates a new slow stage.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Creates a slow stage with delay in milliseconds.
    #[must_use]
    pub fn with_delay_ms(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }
}

#[async_trait]
impl<T: Send + 'static> Stage<T> for SlowStage {
    async fn call(&self, ctx: ExecutionContext, input: T) -> StageOutput<T> {
        tokio::time::sleep(self.delay).await;
        StageOutput::ok(ctx, input)
    }
}

/// A stage that writes one entry into the metadata bag.
#[derive(Debug)]
pub struct TaggingStage {
    key: String,
    value: serde_json::Value,
}

impl TaggingStage {
    /// Creates a new tagging stage.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[async_trait]
impl<T: Send + 'static> Stage<T> for TaggingStage {
    async fn call(&self, ctx: ExecutionContext, input: T) -> StageOutput<T> {
        StageOutput::ok(ctx.with_metadata(self.key.clone(), self.value.clone()), input)
    }
}

/// A pass-through stage that records every context and input it receives.
#[derive(Debug)]
pub struct RecordingStage<T> {
    executions: Mutex<Vec<RecordedExecution<T>>>,
}

/// A recorded invocation.
#[derive(Debug, Clone)]
pub struct RecordedExecution<T> {
    /// The context the stage was called with.
    pub context: ExecutionContext,
    /// The input the stage was called with.
    pub input: T,
}

impl<T: Clone> RecordingStage<T> {
    /// Creates a new recording stage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            executions: Mutex::new(Vec::new()),
        }
    }

    /// Returns all recorded executions.
    #[must_use]
    pub fn executions(&self) -> Vec<RecordedExecution<T>> {
        self.executions.lock().clone()
    }

    /// Returns the number of executions.
    #[must_use]
    pub fn execution_count(&self) -> usize {
        self.executions.lock().len()
    }

    /// Clears recorded executions.
    pub fn clear(&self) {
        self.executions.lock().clear();
    }
}

impl<T: Clone> Default for RecordingStage<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> Stage<T> for RecordingStage<T>
where
    T: Clone + Send + 'static,
{
    async fn call(&self, ctx: ExecutionContext, input: T) -> StageOutput<T> {
        self.executions.lock().push(RecordedExecution {
            context: ctx.clone(),
            input: input.clone(),
        });
        StageOutput::ok(ctx, input)
    }
}
