//! Wide-integer wire codec.
//!
//! The REST API cannot trust JSON numbers above 2^53, so every 64-bit
//! quantity travels as a pair of 32-bit words, low word first:
//!
//! ```text
//! 4294967297  ->  [1, 1]
//! ```
//!
//! In the binary layout the same pair is written as two little-endian u32
//! words, which is byte-for-byte identical to a little-endian u64.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 64-bit value as `[low, high]` 32-bit words.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Uint64Dto(pub [u32; 2]);

impl Uint64Dto {
    /// Builds the DTO from its two words.
    pub const fn new(low: u32, high: u32) -> Self {
        Self([low, high])
    }

    pub const fn low(&self) -> u32 {
        self.0[0]
    }

    pub const fn high(&self) -> u32 {
        self.0[1]
    }

    /// `high * 2^32 + low`.
    pub const fn to_u64(&self) -> u64 {
        ((self.0[1] as u64) << 32) | self.0[0] as u64
    }

    pub const fn from_u64(value: u64) -> Self {
        Self([value as u32, (value >> 32) as u32])
    }
}

impl From<u64> for Uint64Dto {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl From<Uint64Dto> for u64 {
    fn from(dto: Uint64Dto) -> Self {
        dto.to_u64()
    }
}

impl fmt::Display for Uint64Dto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.0[0], self.0[1])
    }
}

/// Declares a `u64` newtype that travels as a [`Uint64Dto`].
macro_rules! wide_u64 {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(from = "crate::uint64::Uint64Dto", into = "crate::uint64::Uint64Dto")]
        pub struct $name(pub u64);

        impl From<crate::uint64::Uint64Dto> for $name {
            fn from(dto: crate::uint64::Uint64Dto) -> Self {
                Self(dto.to_u64())
            }
        }

        impl From<$name> for crate::uint64::Uint64Dto {
            fn from(value: $name) -> Self {
                crate::uint64::Uint64Dto::from_u64(value.0)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

pub(crate) use wide_u64;

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_words_split() {
        let dto = Uint64Dto::from(4_294_967_297u64);
        assert_eq!(dto.low(), 1);
        assert_eq!(dto.high(), 1);
    }

    #[test]
    fn test_extremes() {
        assert_eq!(Uint64Dto::from(0u64), Uint64Dto::new(0, 0));
        assert_eq!(
            Uint64Dto::from(u64::MAX),
            Uint64Dto::new(u32::MAX, u32::MAX)
        );
        assert_eq!(Uint64Dto::new(4294967295, 4294967295).to_u64(), u64::MAX);
    }

    #[test]
    fn test_json_shape_is_two_element_array() {
        let json = serde_json::to_string(&Uint64Dto::new(929036875, 2226345261)).unwrap();
        assert_eq!(json, "[929036875,2226345261]");

        let parsed: Uint64Dto = serde_json::from_str("[1, 0]").unwrap();
        assert_eq!(parsed.to_u64(), 1);
    }

    #[test]
    fn test_wire_words_match_u64_le_bytes() {
        let value = 0x0102_0304_0506_0708u64;
        let dto = Uint64Dto::from(value);
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&dto.low().to_le_bytes());
        bytes.extend_from_slice(&dto.high().to_le_bytes());
        assert_eq!(bytes, value.to_le_bytes());
    }

    proptest! {
        #[test]
        fn prop_round_trip_is_exact(value in any::<u64>()) {
            prop_assert_eq!(u64::from(Uint64Dto::from(value)), value);
        }
    }
}
