//! Built-in stages for cross-cutting concerns.
//!
//! Each type here implements [`Stage`](crate::stages::Stage) and can be mixed
//! freely with business stages in a [`Pipeline`](crate::pipeline::Pipeline).

mod conditional;
mod rate_limit;
mod recovery;
mod request_id;
mod timeout;
mod validation;

pub use conditional::Conditional;
pub use rate_limit::RateLimit;
pub use recovery::Recover;
pub use request_id::RequestId;
pub use timeout::Timeout;
pub use validation::Validate;
