//! # Stagepipe
//!
//! Composable, sequential stage pipelines with an immutable execution
//! context.
//!
//! A [`Pipeline`](pipeline::Pipeline) is an ordered list of
//! [`Stage`](stages::Stage)s. Each stage receives the running
//! [`ExecutionContext`](context::ExecutionContext) and value, and hands back
//! an extended context together with a new value or a failure. The first
//! failure stops the run.
//!
//! Built-in stages cover the usual cross-cutting concerns:
//!
//! - **Request ids**: [`RequestId`](middleware::RequestId)
//! - **Deadlines**: [`Timeout`](middleware::Timeout)
//! - **Panic containment**: [`Recover`](middleware::Recover)
//! - **Input checks**: [`Validate`](middleware::Validate)
//! - **Rate limiting**: [`RateLimit`](middleware::RateLimit)
//! - **Feature gates**: [`Conditional`](middleware::Conditional)
//! - **Logging and spans**: [`Observability`](observability::Observability)
//!   and [`ObservabilityComplete`](observability::ObservabilityComplete)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stagepipe::prelude::*;
//!
//! let pipeline = Pipeline::named("user-service", vec![
//!     Arc::new(RequestId::always()) as Arc<dyn Stage<Value>>,
//!     Arc::new(Observability::new(Arc::new(LoggingTracer))),
//!     Arc::new(Validate::new(not_null)),
//!     business_logic,
//!     Arc::new(ObservabilityComplete::new()),
//! ]);
//!
//! let output = pipeline.run(ExecutionContext::new(), input).await;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod context;
pub mod core;
pub mod errors;
pub mod middleware;
pub mod observability;
pub mod pipeline;
pub mod stages;
pub mod testing;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{
        LogLevel, MiddlewareConfig, ObservabilityConfig, RateLimitConfig, TimeoutConfig,
    };
    pub use crate::context::{Deadline, ExecutionContext, MetadataKey, StartTime};
    pub use crate::core::{Payload, PayloadKind, StageOutput};
    pub use crate::errors::{PipelineError, PipelineResult};
    pub use crate::middleware::{Conditional, RateLimit, Recover, RequestId, Timeout, Validate};
    pub use crate::observability::{
        LoggingTracer, NoopTracer, Observability, ObservabilityComplete, Span, TagValue, Tracer,
    };
    pub use crate::pipeline::Pipeline;
    pub use crate::stages::{from_async_fn, from_fn, Identity, Stage};
    pub use crate::utils::{generate_request_id, iso_timestamp};
}
