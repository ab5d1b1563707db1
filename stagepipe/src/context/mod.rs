//! Request-scoped execution context.
//!
//! This module provides:
//! - The immutable, chain-extended `ExecutionContext`
//! - Well-known metadata keys and typed accessors
//! - Advisory deadlines bound by the timeout stage

#[cfg(test)]
mod context_tests;
mod deadline;
mod execution;
pub mod keys;

pub use deadline::Deadline;
pub use execution::ExecutionContext;
pub use keys::{MetadataKey, StartTime};
