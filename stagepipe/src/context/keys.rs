//! Well-known metadata keys.

use chrono::{DateTime, Utc};
use std::fmt;
use std::time::{Duration, Instant};

/// Open-bag key set by the validation stage.
pub const VALIDATED: &str = "validated";
/// Open-bag key set by the conditional stage when it skips.
pub const CONDITIONAL_SKIPPED: &str = "conditional_skipped";
/// Open-bag key holding the tokens left after a rate limiter admits a run.
pub const RATE_LIMIT_REMAINING: &str = "rate_limit_remaining";
/// Open-bag key holding the configured timeout.
pub const TIMEOUT: &str = "timeout";
/// Open-bag key set by the observability entry stage.
pub const OBSERVED: &str = "observed";
/// Open-bag key holding the observability start time as RFC 3339.
pub const START_TIME: &str = "start_time";

/// A key in an [`ExecutionContext`](super::ExecutionContext).
///
/// Well-known keys carry typed values; `Metadata` keys form the open
/// string-keyed bag and always hold a `serde_json::Value`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MetadataKey {
    /// Request identifier (`String`).
    RequestId,
    /// Name of the running pipeline (`String`).
    PipelineName,
    /// Position of the stage about to run (`usize`).
    StageIndex,
    /// Observability start time ([`StartTime`]).
    StartTime,
    /// Run deadline ([`Deadline`](super::Deadline)).
    Deadline,
    /// Active tracing span (`Arc<dyn Span>`).
    Span,
    /// User identifier (`String`).
    UserId,
    /// Session identifier (`String`).
    SessionId,
    /// Open-ended metadata (`serde_json::Value`).
    Metadata(String),
}

impl MetadataKey {
    /// Creates an open-bag key.
    #[must_use]
    pub fn metadata(key: impl Into<String>) -> Self {
        Self::Metadata(key.into())
    }

    pub(crate) fn is_metadata(&self, name: &str) -> bool {
        matches!(self, Self::Metadata(key) if key == name)
    }
}

impl fmt::Display for MetadataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequestId => f.write_str("request_id"),
            Self::PipelineName => f.write_str("pipeline_name"),
            Self::StageIndex => f.write_str("stage_index"),
            Self::StartTime => f.write_str("start_time"),
            Self::Deadline => f.write_str("deadline"),
            Self::Span => f.write_str("span"),
            Self::UserId => f.write_str("user"),
            Self::SessionId => f.write_str("session"),
            Self::Metadata(key) => write!(f, "metadata.{key}"),
        }
    }
}

/// When the observability entry stage started, in both clocks.
#[derive(Debug, Clone, Copy)]
pub struct StartTime {
    /// Monotonic instant, used for durations.
    pub instant: Instant,
    /// Wall-clock time, used for log fields.
    pub at: DateTime<Utc>,
}

impl StartTime {
    /// Captures the current time.
    #[must_use]
    pub fn now() -> Self {
        Self {
            instant: Instant::now(),
            at: Utc::now(),
        }
    }

    /// Time elapsed since the start.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.instant.elapsed()
    }
}
