//! Mosaic ids.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{digest_words, parse_id_hex};
use crate::config::MOSAIC_HIGH_MASK;
use crate::crypto::hash::sha3_256_multi;
use crate::identity::IdentityError;
use crate::uint64::Uint64Dto;

/// Identifier of a mosaic definition.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Uint64Dto", into = "Uint64Dto")]
pub struct MosaicId(u64);

impl MosaicId {
    /// Wraps a raw id. Mosaic ids never have bit 63 set; anything that does
    /// is a namespace id.
    pub fn new(id: u64) -> Result<Self, IdentityError> {
        if id >> 63 != 0 {
            return Err(IdentityError::InvalidId(format!(
                "{id:016X} has the namespace bit set"
            )));
        }
        Ok(Self(id))
    }

    /// Derives the id a definition gets from its creator's nonce and key.
    ///
    /// `owner_public_key` must be exactly 64 hex chars.
    pub fn from_nonce_and_owner(nonce: u32, owner_public_key: &str) -> Result<Self, IdentityError> {
        if owner_public_key.len() != 64 {
            return Err(IdentityError::InvalidOwnerPublicKey(format!(
                "expected 64 hex chars, got {}",
                owner_public_key.len()
            )));
        }
        let owner = hex::decode(owner_public_key)
            .map_err(|e| IdentityError::InvalidOwnerPublicKey(e.to_string()))?;

        let digest = sha3_256_multi(&[&nonce.to_le_bytes(), &owner]);
        let (low, high) = digest_words(&digest);
        Ok(Self(Uint64Dto::new(low, high & MOSAIC_HIGH_MASK).to_u64()))
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, IdentityError> {
        Self::new(parse_id_hex(hex_str)?)
    }

    pub fn id(&self) -> u64 {
        self.0
    }

    /// Upper-case, zero-padded to 16 chars.
    pub fn to_hex(&self) -> String {
        format!("{:016X}", self.0)
    }

    pub fn to_dto(&self) -> Uint64Dto {
        Uint64Dto::from_u64(self.0)
    }
}

impl TryFrom<Uint64Dto> for MosaicId {
    type Error = IdentityError;

    fn try_from(dto: Uint64Dto) -> Result<Self, Self::Error> {
        Self::new(dto.to_u64())
    }
}

impl From<MosaicId> for Uint64Dto {
    fn from(id: MosaicId) -> Self {
        id.to_dto()
    }
}

impl FromStr for MosaicId {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for MosaicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for MosaicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MosaicId({})", self.to_hex())
    }
}
