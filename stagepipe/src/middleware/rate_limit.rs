//! Token-bucket rate limiting.

use crate::config::RateLimitConfig;
use crate::context::keys::RATE_LIMIT_REMAINING;
use crate::context::ExecutionContext;
use crate::core::StageOutput;
use crate::errors::PipelineError;
use crate::stages::Stage;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug)]
struct Bucket {
    tokens: u32,
    last_refill: Instant,
}

/// Stage admitting at most `capacity` runs per refill interval.
///
/// The bucket belongs to this instance and is shared by every run through
/// it. Once `interval` has elapsed since the last refill the bucket is reset
/// to full capacity. An empty bucket fails the run with
/// [`PipelineError::RateLimitExceeded`] without consuming anything.
#[derive(Debug)]
pub struct RateLimit {
    capacity: u32,
    interval: Duration,
    bucket: Mutex<Bucket>,
}

impl RateLimit {
    /// Creates a limiter with a full bucket.
    #[must_use]
    pub fn new(capacity: u32, interval: Duration) -> Self {
        Self {
            capacity,
            interval,
            bucket: Mutex::new(Bucket {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Creates a limiter from configuration.
    #[must_use]
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.capacity, config.refill_interval())
    }

    /// Returns the bucket capacity.
    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Returns the refill interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns the tokens a run arriving now would find.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        let bucket = self.bucket.lock();
        if bucket.last_refill.elapsed() >= self.interval {
            self.capacity
        } else {
            bucket.tokens
        }
    }

    /// Takes a token, returning how many are left, or `None` when empty.
    fn try_acquire(&self) -> Option<u32> {
        let mut bucket = self.bucket.lock();
        let now = Instant::now();
        if now.duration_since(bucket.last_refill) >= self.interval {
            bucket.tokens = self.capacity;
            bucket.last_refill = now;
        }
        if bucket.tokens == 0 {
            return None;
        }
        bucket.tokens -= 1;
        Some(bucket.tokens)
    }
}

#[async_trait]
impl<T: Send + 'static> Stage<T> for RateLimit {
    async fn call(&self, ctx: ExecutionContext, input: T) -> StageOutput<T> {
        match self.try_acquire() {
            Some(remaining) => {
                StageOutput::ok(ctx.with_metadata(RATE_LIMIT_REMAINING, remaining), input)
            }
            None => {
                debug!(
                    capacity = self.capacity,
                    request_id = ctx.request_id(),
                    "Rate limit exceeded"
                );
                StageOutput::fail(
                    ctx,
                    PipelineError::RateLimitExceeded {
                        capacity: self.capacity,
                    },
                )
            }
        }
    }
}
