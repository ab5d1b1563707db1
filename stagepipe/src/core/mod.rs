//! Core types shared by stages and the pipeline engine.

mod output;
mod payload;

pub use output::StageOutput;
pub use payload::{Payload, PayloadKind};
