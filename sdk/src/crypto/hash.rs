//! # Hashing Utilities
//!
//! The hash primitives catapult-style chains build their identifiers from.
//! Two functions, one derived helper, nothing else:
//!
//! - **SHA3-256** — Keccak-based FIPS 202 SHA3, not the pre-standard Keccak
//!   variant. Used for address derivation, mosaic and namespace ids, address
//!   checksums and transaction hashes.
//!
//! - **RIPEMD-160** — Only ever applied to a SHA3-256 digest of a public key,
//!   to shorten it to the 20 bytes an address carries.
//!
//! Every function here is pure and total over arbitrary input. Malformed
//! hex never reaches this module; callers decode and validate first.

use ripemd::Ripemd160;
use sha3::{Digest, Sha3_256};

/// Length of a SHA3-256 digest in bytes.
pub const SHA3_256_LENGTH: usize = 32;

/// Length of a RIPEMD-160 digest in bytes.
pub const RIPEMD160_LENGTH: usize = 20;

/// Number of digest bytes kept as an address checksum.
pub const CHECKSUM_LENGTH: usize = 4;

/// Compute the SHA3-256 hash of the input data.
///
/// # Example
///
/// ```
/// use sirius_sdk::crypto::sha3_256;
///
/// let hash = sha3_256(b"sirius");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha3_256(data: &[u8]) -> [u8; SHA3_256_LENGTH] {
    let mut hasher = Sha3_256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash multiple byte slices together without concatenation overhead.
///
/// Feeds each part into the same SHA3-256 state in order, so the result is
/// identical to hashing the concatenation.
pub fn sha3_256_multi(parts: &[&[u8]]) -> [u8; SHA3_256_LENGTH] {
    let mut hasher = Sha3_256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Compute the RIPEMD-160 hash of the input data.
pub fn ripemd160(data: &[u8]) -> [u8; RIPEMD160_LENGTH] {
    let mut hasher = Ripemd160::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Address checksum: the first four bytes of `SHA3-256(data)`.
///
/// No dedicated checksum algorithm is involved; this is a truncated second
/// SHA3 pass over the version-prefixed hash.
pub fn generate_checksum(data: &[u8]) -> [u8; CHECKSUM_LENGTH] {
    let digest = sha3_256(data);
    let mut checksum = [0u8; CHECKSUM_LENGTH];
    checksum.copy_from_slice(&digest[..CHECKSUM_LENGTH]);
    checksum
}
