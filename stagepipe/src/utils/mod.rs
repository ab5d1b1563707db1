//! Request id generation and timestamp formatting.

mod ids;
mod timestamps;

pub use ids::{generate_request_id, REQUEST_ID_BYTES};
pub use timestamps::{format_timestamp, iso_timestamp, Timestamp};
