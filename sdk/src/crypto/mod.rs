//! # Cryptographic Primitives
//!
//! Thin wrappers around the audited RustCrypto hashers the chain's
//! identifiers depend on. Signing is not here: the Ed25519 variant the node
//! expects lives behind [`crate::transaction::signing::TransactionSigner`].

pub mod hash;

pub use hash::{generate_checksum, ripemd160, sha3_256, sha3_256_multi};
