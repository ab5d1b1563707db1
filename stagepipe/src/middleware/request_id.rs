//! Request id tagging.

use crate::context::ExecutionContext;
use crate::core::StageOutput;
use crate::stages::Stage;
use crate::utils::generate_request_id;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

type Generator = Arc<dyn Fn() -> String + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Policy {
    /// Only a context that already carries an id gets a fresh one.
    ReplaceExisting,
    /// Every context gets a fresh id.
    Always,
}

/// Stage that assigns request ids.
///
/// The default policy ([`RequestId::new`]) leaves a context without a request
/// id untouched and replaces an existing id with a freshly generated one. Use
/// [`RequestId::always`] to tag every run unconditionally.
#[derive(Clone)]
pub struct RequestId {
    generator: Generator,
    policy: Policy,
}

impl RequestId {
    /// Creates the stage with the default generator and policy.
    #[must_use]
    pub fn new() -> Self {
        Self::with_generator(generate_request_id)
    }

    /// Creates a stage that assigns a fresh id to every run.
    #[must_use]
    pub fn always() -> Self {
        Self::always_with_generator(generate_request_id)
    }

    /// Creates the stage with a custom generator and the default policy.
    pub fn with_generator<F>(generator: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        Self {
            generator: Arc::new(generator),
            policy: Policy::ReplaceExisting,
        }
    }

    /// Creates a stage that assigns an id from `generator` to every run.
    pub fn always_with_generator<F>(generator: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        Self {
            generator: Arc::new(generator),
            policy: Policy::Always,
        }
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestId")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<T: Send + 'static> Stage<T> for RequestId {
    async fn call(&self, ctx: ExecutionContext, input: T) -> StageOutput<T> {
        let assign = match self.policy {
            Policy::ReplaceExisting => ctx.request_id().is_some(),
            Policy::Always => true,
        };
        if !assign {
            return StageOutput::ok(ctx, input);
        }

        let ctx = ctx.with_request_id((self.generator)());
        StageOutput::ok(ctx, input)
    }
}
