//! Network types and their address prefixes.
//!
//! Each network has a version byte that is prepended to every address hash
//! and packed into the high byte of every transaction version. Base32
//! encoding turns the top five bits of that byte into the first address
//! character, which is why a MijinTest address always starts with `S`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::IdentityError;

/// The networks a key can live on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum NetworkType {
    Mijin = 0x60,
    MijinTest = 0x90,
    Public = 0xB8,
    PublicTest = 0xA8,
    Private = 0xC8,
    PrivateTest = 0xB0,
}

impl NetworkType {
    /// Every supported network, in prefix-table order.
    pub const ALL: [NetworkType; 6] = [
        Self::Mijin,
        Self::MijinTest,
        Self::Public,
        Self::PublicTest,
        Self::Private,
        Self::PrivateTest,
    ];

    /// The version byte prepended to addresses.
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    /// Resolves a version byte back into a network.
    pub fn from_byte(byte: u8) -> Result<Self, IdentityError> {
        Self::ALL
            .into_iter()
            .find(|network| network.as_byte() == byte)
            .ok_or(IdentityError::UnknownNetworkType(byte))
    }

    /// The first character of every address on this network.
    pub const fn prefix(self) -> char {
        match self {
            Self::Mijin => 'M',
            Self::MijinTest => 'S',
            Self::Public => 'X',
            Self::PublicTest => 'V',
            Self::Private => 'Z',
            Self::PrivateTest => 'W',
        }
    }

    /// Resolves the first character of an encoded address into a network.
    pub fn from_prefix(prefix: char) -> Result<Self, IdentityError> {
        match prefix.to_ascii_uppercase() {
            'M' => Ok(Self::Mijin),
            'S' => Ok(Self::MijinTest),
            'X' => Ok(Self::Public),
            'V' => Ok(Self::PublicTest),
            'Z' => Ok(Self::Private),
            'W' => Ok(Self::PrivateTest),
            other => Err(IdentityError::UnknownNetworkPrefix(other)),
        }
    }

    /// Extracts the network from a packed transaction version
    /// (`network_byte << 24 | entity_version`).
    pub fn from_packed_version(version: u32) -> Result<Self, IdentityError> {
        Self::from_byte((version >> 24) as u8)
    }
}

impl TryFrom<u8> for NetworkType {
    type Error = IdentityError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Self::from_byte(byte)
    }
}

impl From<NetworkType> for u8 {
    fn from(network: NetworkType) -> Self {
        network.as_byte()
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mijin => "mijin",
            Self::MijinTest => "mijin-test",
            Self::Public => "public",
            Self::PublicTest => "public-test",
            Self::Private => "private",
            Self::PrivateTest => "private-test",
        };
        f.write_str(name)
    }
}

impl FromStr for NetworkType {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|network| network.to_string() == normalized)
            .ok_or_else(|| IdentityError::UnknownNetworkName(s.to_string()))
    }
}
