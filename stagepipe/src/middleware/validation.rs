//! Input validation.

use crate::context::keys::VALIDATED;
use crate::context::ExecutionContext;
use crate::core::StageOutput;
use crate::errors::PipelineError;
use crate::stages::Stage;
use async_trait::async_trait;
use std::fmt;

/// Stage that checks the input with a caller-supplied validator.
///
/// A rejected input fails the run with [`PipelineError::Validation`]. An
/// accepted one passes through unchanged with `validated = true` recorded in
/// the metadata bag.
pub struct Validate<F> {
    validator: F,
}

impl<F> Validate<F> {
    /// Creates the stage.
    pub fn new(validator: F) -> Self {
        Self { validator }
    }
}

impl<F> fmt::Debug for Validate<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validate").finish_non_exhaustive()
    }
}

#[async_trait]
impl<T, F> Stage<T> for Validate<F>
where
    T: Send + 'static,
    F: Fn(&T) -> anyhow::Result<()> + Send + Sync,
{
    async fn call(&self, ctx: ExecutionContext, input: T) -> StageOutput<T> {
        if let Err(err) = (self.validator)(&input) {
            return StageOutput::fail(ctx, PipelineError::validation(format!("{err:#}")));
        }
        StageOutput::ok(ctx.with_metadata(VALIDATED, true), input)
    }
}
