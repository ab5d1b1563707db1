//! Request identifier generation.

use rand::rngs::OsRng;
use rand::RngCore;

/// Number of random bytes in a generated request id.
pub const REQUEST_ID_BYTES: usize = 8;

/// Generates a request id: 8 bytes from the OS entropy source rendered as
/// 16 lowercase hex characters.
///
/// # Examples
///
/// ```
/// use stagepipe::utils::generate_request_id;
///
/// let id = generate_request_id();
/// assert_eq!(id.len(), 16);
/// assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
/// ```
#[must_use]
pub fn generate_request_id() -> String {
    let mut bytes = [0_u8; REQUEST_ID_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_request_id_shape() {
        let id = generate_request_id();
        assert_eq!(id.len(), REQUEST_ID_BYTES * 2);
        assert!(id.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_request_ids_are_distinct() {
        let ids: HashSet<_> = (0..1000).map(|_| generate_request_id()).collect();
        assert_eq!(ids.len(), 1000);
    }
}
