//! Coarse payload classification used for log fields and span tags.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// The closed set of payload kinds reported by observability stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadKind {
    /// No value (`None`, JSON `null`).
    Nil,
    /// A string.
    String,
    /// A signed integer.
    Int,
    /// An unsigned integer.
    Uint,
    /// A floating point number.
    Float,
    /// A boolean.
    Bool,
    /// Raw bytes.
    Bytes,
    /// A string-keyed mapping.
    Mapping,
    /// Anything else.
    Other,
}

impl PayloadKind {
    /// Returns the tag value used on spans and in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::String => "string",
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Bytes => "bytes",
            Self::Mapping => "mapping",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value that can flow through observability stages.
///
/// Implemented for the common scalar types, byte vectors, string-keyed maps,
/// `Option<P>` and `serde_json::Value`. Custom payload types return
/// [`PayloadKind::Other`] unless they override [`Payload::kind`].
pub trait Payload {
    /// Classifies the value.
    fn kind(&self) -> PayloadKind {
        PayloadKind::Other
    }
}

macro_rules! impl_payload {
    ($kind:expr => $($ty:ty),+ $(,)?) => {
        $(
            impl Payload for $ty {
                fn kind(&self) -> PayloadKind {
                    $kind
                }
            }
        )+
    };
}

impl_payload!(PayloadKind::String => String, &str);
impl_payload!(PayloadKind::Int => i8, i16, i32, i64, i128, isize);
impl_payload!(PayloadKind::Uint => u8, u16, u32, u64, u128, usize);
impl_payload!(PayloadKind::Float => f32, f64);
impl_payload!(PayloadKind::Bool => bool);
impl_payload!(PayloadKind::Bytes => Vec<u8>, &[u8]);
impl_payload!(PayloadKind::Nil => ());

impl<V> Payload for HashMap<String, V> {
    fn kind(&self) -> PayloadKind {
        PayloadKind::Mapping
    }
}

impl<V> Payload for BTreeMap<String, V> {
    fn kind(&self) -> PayloadKind {
        PayloadKind::Mapping
    }
}

impl<P: Payload> Payload for Option<P> {
    fn kind(&self) -> PayloadKind {
        self.as_ref().map_or(PayloadKind::Nil, Payload::kind)
    }
}

impl Payload for serde_json::Value {
    fn kind(&self) -> PayloadKind {
        match self {
            Self::Null => PayloadKind::Nil,
            Self::Bool(_) => PayloadKind::Bool,
            Self::Number(n) if n.is_i64() => PayloadKind::Int,
            Self::Number(n) if n.is_u64() => PayloadKind::Uint,
            Self::Number(_) => PayloadKind::Float,
            Self::String(_) => PayloadKind::String,
            Self::Object(_) => PayloadKind::Mapping,
            Self::Array(_) => PayloadKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_kinds() {
        assert_eq!("hi".kind(), PayloadKind::String);
        assert_eq!(42_i64.kind(), PayloadKind::Int);
        assert_eq!(7_u8.kind(), PayloadKind::Uint);
        assert_eq!(1.5_f64.kind(), PayloadKind::Float);
        assert_eq!(true.kind(), PayloadKind::Bool);
        assert_eq!(vec![1_u8, 2].kind(), PayloadKind::Bytes);
    }

    #[test]
    fn test_option_kind() {
        let none: Option<String> = None;
        assert_eq!(none.kind(), PayloadKind::Nil);
        assert_eq!(Some(3_i32).kind(), PayloadKind::Int);
    }

    #[test]
    fn test_json_kinds() {
        assert_eq!(json!(null).kind(), PayloadKind::Nil);
        assert_eq!(json!(-3).kind(), PayloadKind::Int);
        assert_eq!(json!(2.5).kind(), PayloadKind::Float);
        assert_eq!(json!({"a": 1}).kind(), PayloadKind::Mapping);
        assert_eq!(json!([1, 2]).kind(), PayloadKind::Other);
        assert_eq!(json!(u64::MAX).kind(), PayloadKind::Uint);
    }

    #[test]
    fn test_display() {
        assert_eq!(PayloadKind::Mapping.to_string(), "mapping");
    }
}
