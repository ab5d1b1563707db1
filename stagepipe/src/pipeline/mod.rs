//! Pipeline construction and execution.
//!
//! This module provides:
//! - The immutable `Pipeline` with copy-on-extend `append` / `prepend`
//! - Sequential, short-circuiting execution via `Pipeline::run`

mod sequential;

pub use sequential::Pipeline;
