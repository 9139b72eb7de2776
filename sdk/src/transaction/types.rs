//! Core type definitions for chain transactions.
//!
//! These types form the vocabulary of every transaction the SDK encodes.
//! They are kept small and `Copy` where possible so the codec never has to
//! allocate for a scalar field.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitXor;
use std::str::FromStr;

use crate::config::{HASH_SIZE, SIGNATURE_SIZE};
use crate::uint64::wide_u64;

// ---------------------------------------------------------------------------
// EntityType
// ---------------------------------------------------------------------------

/// Discriminant stored at the type slot of every transaction.
///
/// Every transaction the SDK understands falls into exactly one of these
/// kinds. The value is written little-endian at byte offset 104.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
#[repr(u16)]
pub enum EntityType {
    PrepareDrive = 0x415A,
    JoinToDrive = 0x425A,
    DriveFileSystem = 0x435A,
    FilesDeposit = 0x445A,
    EndDrive = 0x455A,
    DriveFilesReward = 0x465A,
    StartDriveVerification = 0x475A,
    EndDriveVerification = 0x485A,
    StartFileDownload = 0x495A,
    EndFileDownload = 0x4A5A,
    AggregateCompleted = 0x4141,
    AggregateBonded = 0x4241,
}

impl EntityType {
    pub const ALL: [EntityType; 12] = [
        Self::PrepareDrive,
        Self::JoinToDrive,
        Self::DriveFileSystem,
        Self::FilesDeposit,
        Self::EndDrive,
        Self::DriveFilesReward,
        Self::StartDriveVerification,
        Self::EndDriveVerification,
        Self::StartFileDownload,
        Self::EndFileDownload,
        Self::AggregateCompleted,
        Self::AggregateBonded,
    ];

    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Returns `true` for the two aggregate containers.
    pub const fn is_aggregate(self) -> bool {
        matches!(self, Self::AggregateCompleted | Self::AggregateBonded)
    }
}

/// A type slot value no decoder is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownEntityType(pub u16);

impl fmt::Display for UnknownEntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown entity type 0x{:04X}", self.0)
    }
}

impl TryFrom<u16> for EntityType {
    type Error = UnknownEntityType;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_u16() == value)
            .ok_or(UnknownEntityType(value))
    }
}

impl From<EntityType> for u16 {
    fn from(t: EntityType) -> Self {
        t.as_u16()
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrepareDrive => write!(f, "PrepareDrive"),
            Self::JoinToDrive => write!(f, "JoinToDrive"),
            Self::DriveFileSystem => write!(f, "DriveFileSystem"),
            Self::FilesDeposit => write!(f, "FilesDeposit"),
            Self::EndDrive => write!(f, "EndDrive"),
            Self::DriveFilesReward => write!(f, "DriveFilesReward"),
            Self::StartDriveVerification => write!(f, "StartDriveVerification"),
            Self::EndDriveVerification => write!(f, "EndDriveVerification"),
            Self::StartFileDownload => write!(f, "StartFileDownload"),
            Self::EndFileDownload => write!(f, "EndFileDownload"),
            Self::AggregateCompleted => write!(f, "AggregateCompleted"),
            Self::AggregateBonded => write!(f, "AggregateBonded"),
        }
    }
}

// ---------------------------------------------------------------------------
// Wide scalars
// ---------------------------------------------------------------------------

wide_u64!(
    /// A token amount in the smallest indivisible unit.
    Amount
);

wide_u64!(
    /// A block height.
    Height
);

wide_u64!(
    /// A duration measured in blocks.
    Duration
);

wide_u64!(
    /// A storage size in bytes.
    StorageSize
);

// ---------------------------------------------------------------------------
// Hash
// ---------------------------------------------------------------------------

/// A 32-byte digest: file hashes, root hashes, transaction hashes.
///
/// Serialized as a 64-character upper-case hex string. Parsing accepts
/// either case.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash(pub [u8; HASH_SIZE]);

impl Hash {
    pub const ZERO: Hash = Hash([0u8; HASH_SIZE]);

    pub const fn new(bytes: [u8; HASH_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; HASH_SIZE]
    }

    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }
}

impl BitXor for Hash {
    type Output = Hash;

    fn bitxor(self, rhs: Hash) -> Hash {
        let mut out = [0u8; HASH_SIZE];
        for (i, byte) in out.iter_mut().enumerate() {
            *byte = self.0[i] ^ rhs.0[i];
        }
        Hash(out)
    }
}

impl FromStr for Hash {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; HASH_SIZE];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Hash(bytes))
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.to_hex())
    }
}

impl Serialize for Hash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// A 64-byte Ed25519 signature. The zero value marks an unsigned payload.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature(pub [u8; SIGNATURE_SIZE]);

impl Signature {
    pub const ZERO: Signature = Signature([0u8; SIGNATURE_SIZE]);

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_SIZE] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; SIGNATURE_SIZE]
    }

    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }
}

impl Default for Signature {
    fn default() -> Self {
        Self::ZERO
    }
}

impl FromStr for Signature {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; SIGNATURE_SIZE];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Signature(bytes))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}..)", &self.to_hex()[..16])
    }
}

/// Serde adapter for 32-byte keys as upper-case hex strings.
pub mod hex_key {
    use crate::config::KEY_SIZE;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(key: &[u8; KEY_SIZE], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode_upper(key))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; KEY_SIZE], D::Error> {
        let s = String::deserialize(deserializer)?;
        let mut key = [0u8; KEY_SIZE];
        hex::decode_to_slice(&s, &mut key).map_err(serde::de::Error::custom)?;
        Ok(key)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
