//! # Identity
//!
//! Networks, addresses and public accounts. Everything here is derived
//! deterministically from a public key and a network byte, so nothing in
//! this module touches private keys.

pub mod account;
pub mod address;
pub mod network;

pub use account::PublicAccount;
pub use address::Address;
pub use network::NetworkType;

use thiserror::Error;

/// Errors raised while deriving or parsing identities.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid owner public key: {0}")]
    InvalidOwnerPublicKey(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("unknown network type byte 0x{0:02X}")]
    UnknownNetworkType(u8),

    #[error("unknown network prefix '{0}'")]
    UnknownNetworkPrefix(char),

    #[error("unknown network name '{0}'")]
    UnknownNetworkName(String),

    #[error("invalid namespace name: {0}")]
    InvalidNamespaceName(String),

    #[error("invalid asset id: {0}")]
    InvalidId(String),
}
