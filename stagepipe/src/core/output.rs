//! Stage output: the context a stage hands on, plus its value or failure.

use crate::context::ExecutionContext;
use crate::errors::PipelineError;

/// The outcome of invoking a stage or running a pipeline.
///
/// The context is always present, even on failure, so callers can inspect
/// whatever metadata the failing stage had set. On failure there is no
/// output value.
#[derive(Debug)]
pub struct StageOutput<T> {
    /// The context produced by the stage.
    pub context: ExecutionContext,
    /// The output value, or the reason the stage failed.
    pub result: Result<T, PipelineError>,
}

impl<T> StageOutput<T> {
    /// Creates a successful output.
    #[must_use]
    pub fn ok(context: ExecutionContext, value: T) -> Self {
        Self {
            context,
            result: Ok(value),
        }
    }

    /// Creates a failed output.
    #[must_use]
    pub fn fail(context: ExecutionContext, error: impl Into<PipelineError>) -> Self {
        Self {
            context,
            result: Err(error.into()),
        }
    }

    /// Returns true if the stage succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Returns the error, if the stage failed.
    #[must_use]
    pub fn error(&self) -> Option<&PipelineError> {
        self.result.as_ref().err()
    }

    /// Returns the value, if the stage succeeded.
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        self.result.as_ref().ok()
    }

    /// Splits into context and result.
    #[must_use]
    pub fn into_parts(self) -> (ExecutionContext, Result<T, PipelineError>) {
        (self.context, self.result)
    }

    /// Discards the context.
    pub fn into_result(self) -> Result<T, PipelineError> {
        self.result
    }

    /// Transforms a successful value, keeping the context.
    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> StageOutput<U> {
        StageOutput {
            context: self.context,
            result: self.result.map(f),
        }
    }
}
