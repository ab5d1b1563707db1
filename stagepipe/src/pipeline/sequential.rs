//! The immutable, sequentially executed pipeline.

use crate::context::ExecutionContext;
use crate::core::StageOutput;
use crate::stages::Stage;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// An ordered, immutable sequence of stages.
///
/// Extension never modifies a pipeline in place: [`append`](Self::append)
/// and [`prepend`](Self::prepend) build a fresh stage list. Cloning shares
/// the immutable list, so a pipeline can be handed to many tasks and run
/// concurrently.
pub struct Pipeline<T: Send + 'static> {
    stages: Arc<[Arc<dyn Stage<T>>]>,
    name: Option<Arc<str>>,
}

impl<T: Send + 'static> Pipeline<T> {
    /// Creates an unnamed pipeline from the given stages, in order.
    pub fn new(stages: impl IntoIterator<Item = Arc<dyn Stage<T>>>) -> Self {
        Self {
            stages: stages.into_iter().collect(),
            name: None,
        }
    }

    /// Creates a named pipeline. The name is recorded on the context of
    /// every run.
    pub fn named(
        name: impl Into<String>,
        stages: impl IntoIterator<Item = Arc<dyn Stage<T>>>,
    ) -> Self {
        Self {
            stages: stages.into_iter().collect(),
            name: Some(Arc::from(name.into())),
        }
    }

    /// Returns a new pipeline running `self`'s stages followed by `stages`.
    #[must_use]
    pub fn append(&self, stages: impl IntoIterator<Item = Arc<dyn Stage<T>>>) -> Self {
        Self {
            stages: self.stages.iter().cloned().chain(stages).collect(),
            name: self.name.clone(),
        }
    }

    /// Returns a new pipeline running `stages` followed by `self`'s stages.
    #[must_use]
    pub fn prepend(&self, stages: impl IntoIterator<Item = Arc<dyn Stage<T>>>) -> Self {
        Self {
            stages: stages.into_iter().chain(self.stages.iter().cloned()).collect(),
            name: self.name.clone(),
        }
    }

    /// Returns a copy of this pipeline under a different name.
    #[must_use]
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            stages: Arc::clone(&self.stages),
            name: Some(Arc::from(name.into())),
        }
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns true if the pipeline has no stages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Returns the pipeline name, if set.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Runs the stages in order.
    ///
    /// Before each stage the context is extended with the stage's position.
    /// The first failure stops the run: the failing stage's context is
    /// returned together with its error wrapped in
    /// [`PipelineError::Stage`](crate::errors::PipelineError::Stage).
    pub async fn run(&self, ctx: ExecutionContext, input: T) -> StageOutput<T> {
        if self.stages.is_empty() {
            return StageOutput::ok(ctx, input);
        }

        let mut ctx = match &self.name {
            Some(name) => ctx.with_pipeline_name(&**name),
            None => ctx,
        };
        let mut value = input;

        for (index, stage) in self.stages.iter().enumerate() {
            let StageOutput { context, result } =
                stage.call(ctx.with_stage_index(index), value).await;

            match result {
                Ok(next) => {
                    ctx = context;
                    value = next;
                }
                Err(error) => {
                    debug!(
                        pipeline = self.name(),
                        stage_index = index,
                        error = %error,
                        "Pipeline stage failed"
                    );
                    return StageOutput::fail(context, error.at_stage(index));
                }
            }
        }

        StageOutput::ok(ctx, value)
    }
}

impl<T: Send + 'static> Clone for Pipeline<T> {
    fn clone(&self) -> Self {
        Self {
            stages: Arc::clone(&self.stages),
            name: self.name.clone(),
        }
    }
}

impl<T: Send + 'static> Default for Pipeline<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T: Send + 'static> fmt::Debug for Pipeline<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name())
            .field("len", &self.len())
            .finish()
    }
}

#[async_trait]
impl<T: Send + 'static> Stage<T> for Pipeline<T> {
    async fn call(&self, ctx: ExecutionContext, input: T) -> StageOutput<T> {
        self.run(ctx, input).await
    }
}
