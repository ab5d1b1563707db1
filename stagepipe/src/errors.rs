//! Error types for stagepipe.
//!
//! Every failure a stage can report, and the engine's own wrapping of those
//! failures, is a [`PipelineError`].

use crate::core::PayloadKind;
use std::time::Duration;
use thiserror::Error;

/// Result alias used by stage helpers.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// The error type reported by stages and by pipeline execution.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A caller-supplied validator rejected the input.
    #[error("validation failed: {message}")]
    Validation {
        /// The validator's message.
        message: String,
    },

    /// The token bucket of a rate limiter was empty.
    #[error("rate limit exceeded (capacity {capacity})")]
    RateLimitExceeded {
        /// The bucket capacity.
        capacity: u32,
    },

    /// The input did not have the shape a stage expected.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Description of the expected shape.
        expected: String,
        /// The kind that was actually received.
        actual: PayloadKind,
    },

    /// A panic was intercepted by a recovery stage.
    #[error("panic recovered: {message}")]
    Panicked {
        /// The panic payload rendered as text.
        message: String,
    },

    /// A stage observed that the run's deadline had passed.
    #[error("deadline exceeded (timeout {timeout:?})")]
    DeadlineExceeded {
        /// The timeout that was configured.
        timeout: Duration,
    },

    /// A stage was cancelled through the run's deadline handle.
    #[error("cancelled: {reason}")]
    Cancelled {
        /// The first cancellation reason.
        reason: String,
    },

    /// The engine's wrapping of a stage failure with its position.
    #[error("stage {index} failed: {source}")]
    Stage {
        /// 0-based position of the failing stage.
        index: usize,
        /// The stage's own error.
        #[source]
        source: Box<PipelineError>,
    },

    /// Any other failure raised by a custom stage.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PipelineError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a type mismatch error.
    #[must_use]
    pub fn type_mismatch(expected: impl Into<String>, actual: PayloadKind) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            actual,
        }
    }

    /// Creates an error from a plain message.
    #[must_use]
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Other(anyhow::Error::msg(message.into()))
    }

    /// Wraps `self` with the position of the stage that produced it.
    #[must_use]
    pub fn at_stage(self, index: usize) -> Self {
        Self::Stage {
            index,
            source: Box::new(self),
        }
    }

    /// Returns the position of the failing stage for engine-wrapped errors.
    #[must_use]
    pub fn failed_stage(&self) -> Option<usize> {
        match self {
            Self::Stage { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// Strips every layer of stage wrapping.
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        let mut current = self;
        while let Self::Stage { source, .. } = current {
            current = source.as_ref();
        }
        current
    }

    /// Returns true if the root cause is a validation failure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self.root_cause(), Self::Validation { .. })
    }

    /// Returns true if the root cause is an exhausted rate limiter.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self.root_cause(), Self::RateLimitExceeded { .. })
    }

    /// Returns true if the root cause is a contained panic.
    #[must_use]
    pub fn is_panic(&self) -> bool {
        matches!(self.root_cause(), Self::Panicked { .. })
    }

    /// Returns true if the root cause is an expired or cancelled deadline.
    #[must_use]
    pub fn is_deadline(&self) -> bool {
        matches!(
            self.root_cause(),
            Self::DeadlineExceeded { .. } | Self::Cancelled { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_wrapping_message() {
        let err = PipelineError::validation("input cannot be nil").at_stage(1);
        assert_eq!(
            err.to_string(),
            "stage 1 failed: validation failed: input cannot be nil"
        );
        assert_eq!(err.failed_stage(), Some(1));
        assert!(err.is_validation());
    }

    #[test]
    fn test_root_cause_unwraps_nesting() {
        let err = PipelineError::RateLimitExceeded { capacity: 3 }
            .at_stage(0)
            .at_stage(2);
        assert_eq!(err.failed_stage(), Some(2));
        assert!(matches!(
            err.root_cause(),
            PipelineError::RateLimitExceeded { capacity: 3 }
        ));
        assert!(err.is_rate_limited());
    }

    #[test]
    fn test_source_chain() {
        use std::error::Error as _;

        let err = PipelineError::Panicked {
            message: "boom".to_string(),
        }
        .at_stage(4);
        let source = err.source().map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("panic recovered: boom"));
    }

    #[test]
    fn test_other_is_transparent() {
        let err = PipelineError::msg("payload invalid");
        assert_eq!(err.to_string(), "payload invalid");
        assert_eq!(err.failed_stage(), None);
    }

    #[test]
    fn test_type_mismatch_message() {
        let err = PipelineError::type_mismatch("mapping", PayloadKind::String);
        assert_eq!(err.to_string(), "type mismatch: expected mapping, got string");
    }
}
