//! # Asset Identifiers
//!
//! Mosaic and namespace ids. Both are 64-bit values derived by hashing, and
//! both travel as [`Uint64Dto`](crate::uint64::Uint64Dto) word pairs.
//!
//! ```text
//! MosaicId     = sha3(nonce LE ++ owner)[0..8], bit 63 cleared
//! NamespaceId  = sha3(parent words ++ part)[0..8], bit 63 set
//! ```
//!
//! The two ranges never overlap, so an id alone tells which kind of alias it
//! refers to.

pub mod mosaic;
pub mod namespace;

pub use mosaic::MosaicId;
pub use namespace::{
    NamespaceId, WellKnown, STORAGE_NAMESPACE_ID, STREAMING_NAMESPACE_ID,
    SUPER_CONTRACT_NAMESPACE_ID, XEM_NAMESPACE_ID, XPX_NAMESPACE_ID,
};

use crate::identity::IdentityError;

/// Parses the canonical 16-char hex form shared by both id kinds.
fn parse_id_hex(hex_str: &str) -> Result<u64, IdentityError> {
    if hex_str.len() != 16 {
        return Err(IdentityError::InvalidId(format!(
            "expected 16 hex chars, got {}",
            hex_str.len()
        )));
    }
    u64::from_str_radix(hex_str, 16).map_err(|e| IdentityError::InvalidId(e.to_string()))
}

/// Reads the first eight digest bytes as two little-endian words.
fn digest_words(digest: &[u8; 32]) -> (u32, u32) {
    let low = u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]);
    let high = u32::from_le_bytes([digest[4], digest[5], digest[6], digest[7]]);
    (low, high)
}
