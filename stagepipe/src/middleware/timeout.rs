//! Timeout scoping.

use crate::config::TimeoutConfig;
use crate::context::keys::TIMEOUT;
use crate::context::{Deadline, ExecutionContext};
use crate::core::StageOutput;
use crate::stages::Stage;
use async_trait::async_trait;
use std::time::Duration;

/// Stage that binds a deadline to the context.
///
/// The deadline starts counting when this stage runs. It is advisory: the
/// engine never interrupts a stage, so downstream stages honor it with
/// [`ExecutionContext::check_deadline`] or [`Deadline::run`]. The configured
/// duration is also recorded under `timeout` in the metadata bag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeout {
    timeout: Duration,
}

impl Timeout {
    /// Creates the stage.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Creates the stage from configuration.
    #[must_use]
    pub fn from_config(config: &TimeoutConfig) -> Self {
        Self::new(config.timeout())
    }

    /// Returns the configured duration.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.timeout
    }
}

impl Default for Timeout {
    fn default() -> Self {
        Self::from_config(&TimeoutConfig::default())
    }
}

#[async_trait]
impl<T: Send + 'static> Stage<T> for Timeout {
    async fn call(&self, ctx: ExecutionContext, input: T) -> StageOutput<T> {
        let ctx = ctx
            .with_deadline(Deadline::after(self.timeout))
            .with_metadata(TIMEOUT, format!("{:?}", self.timeout));
        StageOutput::ok(ctx, input)
    }
}
