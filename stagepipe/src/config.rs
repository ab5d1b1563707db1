//! Configuration types for the built-in stages.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Log severity used by configurable stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warn level.
    Warn,
    /// Error level.
    Error,
}

/// Configuration for the observability entry stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Name of the span started for each run.
    #[serde(default = "default_span_name")]
    pub span_name: String,
    /// Whether the input is logged and tagged with its kind.
    #[serde(default = "default_log_input")]
    pub log_input: bool,
    /// Level of the "Request started" record.
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_span_name() -> String {
    "middleware.request".to_string()
}

fn default_log_input() -> bool {
    true
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            span_name: default_span_name(),
            log_input: default_log_input(),
            log_level: LogLevel::default(),
        }
    }
}

impl ObservabilityConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the span name. An empty name falls back to the default.
    #[must_use]
    pub fn with_span_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.span_name = if name.is_empty() {
            default_span_name()
        } else {
            name
        };
        self
    }

    /// Sets whether the input is logged.
    #[must_use]
    pub fn with_log_input(mut self, log_input: bool) -> Self {
        self.log_input = log_input;
        self
    }

    /// Sets the level of the start record.
    #[must_use]
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }
}

/// Configuration for a token-bucket rate limiter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Bucket capacity: requests admitted per interval.
    pub capacity: u32,
    /// Interval after which the bucket is refilled, in milliseconds.
    #[serde(default = "default_refill_interval_ms")]
    pub refill_interval_ms: u64,
}

fn default_refill_interval_ms() -> u64 {
    1000
}

impl RateLimitConfig {
    /// Creates a configuration admitting `capacity` requests per `interval`.
    #[must_use]
    pub fn new(capacity: u32, interval: Duration) -> Self {
        Self {
            capacity,
            refill_interval_ms: u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Gets the refill interval as a Duration.
    #[must_use]
    pub fn refill_interval(&self) -> Duration {
        Duration::from_millis(self.refill_interval_ms)
    }
}

/// Configuration for the timeout stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Deadline relative to the moment the stage runs, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl TimeoutConfig {
    /// Gets the timeout as a Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Settings for the built-in stages, typically loaded from a service's
/// configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// Observability entry stage settings.
    #[serde(default)]
    pub observability: ObservabilityConfig,
    /// Rate limiter settings; `None` disables rate limiting.
    #[serde(default)]
    pub rate_limit: Option<RateLimitConfig>,
    /// Timeout settings; `None` disables timeout scoping.
    #[serde(default)]
    pub timeout: Option<TimeoutConfig>,
}

impl MiddlewareConfig {
    /// Parses a configuration from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
