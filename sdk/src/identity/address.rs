//! # Addresses
//!
//! An address is derived from a public key in five steps:
//!
//! ```text
//! public_key (32 bytes)
//!     -> SHA3-256                      -> 32 bytes
//!     -> RIPEMD-160                    -> 20 bytes
//!     -> network_byte ++ hash          -> 21 bytes
//!     -> ++ SHA3-256(versioned)[0..4]  -> 25 bytes
//!     -> base32 (RFC 4648)             -> 40 characters
//! ```
//!
//! The checksum catches typos when an address is pasted back in. The first
//! character identifies the network, so `S...` is always MijinTest.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{IdentityError, NetworkType};
use crate::config::{ADDRESS_DECODED_SIZE, ADDRESS_ENCODED_SIZE, KEY_SIZE};
use crate::crypto::hash::{generate_checksum, ripemd160, sha3_256, CHECKSUM_LENGTH};

const BASE32: base32::Alphabet = base32::Alphabet::Rfc4648 { padding: false };

/// A network-prefixed, checksummed, base32-encoded account address.
///
/// Immutable once built. Two addresses are equal when their encoded strings
/// are equal.
#[derive(Clone, Eq)]
pub struct Address {
    network_type: NetworkType,
    address: String,
}

impl Address {
    /// Derives the address of a hex-encoded public key on `network_type`.
    ///
    /// # Example
    ///
    /// ```
    /// use sirius_sdk::identity::{Address, NetworkType};
    ///
    /// let address = Address::from_public_key(
    ///     "321DE652C4D3362FC2DDF7800F6582F4A10CFEA134B81F8AB6E4BE78BBA4D18E",
    ///     NetworkType::MijinTest,
    /// )
    /// .unwrap();
    /// assert_eq!(address.as_str(), "SBFBW6TUGLEWQIBCMTBMXXQORZKUP3WTVVTOKK5M");
    /// ```
    pub fn from_public_key(public_key: &str, network_type: NetworkType) -> Result<Self, IdentityError> {
        let key = decode_public_key(public_key)?;
        Ok(Self::from_public_key_bytes(&key, network_type))
    }

    /// Derives the address of a raw public key. Infallible: every 32-byte
    /// string is a valid hash input.
    pub fn from_public_key_bytes(public_key: &[u8; KEY_SIZE], network_type: NetworkType) -> Self {
        let key_hash = sha3_256(public_key);
        let short_hash = ripemd160(&key_hash);

        let mut raw = Vec::with_capacity(ADDRESS_DECODED_SIZE);
        raw.push(network_type.as_byte());
        raw.extend_from_slice(&short_hash);
        let checksum = generate_checksum(&raw);
        raw.extend_from_slice(&checksum);

        Self {
            network_type,
            address: base32::encode(BASE32, &raw),
        }
    }

    /// Parses an encoded address, accepting the dash-separated pretty form
    /// and lower case. The checksum and the network prefix are verified.
    pub fn from_encoded(encoded: &str) -> Result<Self, IdentityError> {
        let normalized: String = encoded
            .chars()
            .filter(|c| *c != '-')
            .map(|c| c.to_ascii_uppercase())
            .collect();

        if normalized.len() != ADDRESS_ENCODED_SIZE {
            return Err(IdentityError::InvalidAddress(format!(
                "expected {} characters, got {}",
                ADDRESS_ENCODED_SIZE,
                normalized.len()
            )));
        }

        let raw = base32::decode(BASE32, &normalized)
            .ok_or_else(|| IdentityError::InvalidAddress("not valid base32".to_string()))?;
        Self::from_raw(&raw)
    }

    /// Parses the 25 raw address bytes.
    pub fn from_raw(raw: &[u8]) -> Result<Self, IdentityError> {
        if raw.len() != ADDRESS_DECODED_SIZE {
            return Err(IdentityError::InvalidAddress(format!(
                "expected {} raw bytes, got {}",
                ADDRESS_DECODED_SIZE,
                raw.len()
            )));
        }

        let (versioned, checksum) = raw.split_at(ADDRESS_DECODED_SIZE - CHECKSUM_LENGTH);
        if generate_checksum(versioned) != checksum {
            return Err(IdentityError::InvalidAddress("checksum mismatch".to_string()));
        }

        let network_type = NetworkType::from_byte(raw[0])?;
        Ok(Self {
            network_type,
            address: base32::encode(BASE32, raw),
        })
    }

    /// Parses the hex form of the raw bytes, as the node reports it in
    /// fields such as `ownerAddress`.
    pub fn from_hex(raw_hex: &str) -> Result<Self, IdentityError> {
        let raw = hex::decode(raw_hex).map_err(|e| IdentityError::InvalidAddress(e.to_string()))?;
        Self::from_raw(&raw)
    }

    /// The 40-character encoded form.
    pub fn as_str(&self) -> &str {
        &self.address
    }

    pub fn network_type(&self) -> NetworkType {
        self.network_type
    }

    /// The 25 raw bytes behind the encoded form.
    pub fn to_raw(&self) -> Vec<u8> {
        // Constructors only ever store valid base32 of exactly 25 bytes.
        base32::decode(BASE32, &self.address).unwrap_or_default()
    }

    /// Upper-case hex of the raw bytes.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.to_raw())
    }

    /// Groups of six characters separated by dashes, as wallets show it.
    pub fn pretty(&self) -> String {
        self.address
            .as_bytes()
            .chunks(6)
            .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
            .collect::<Vec<_>>()
            .join("-")
    }
}

/// Decodes a 64-character hex public key.
pub(crate) fn decode_public_key(public_key: &str) -> Result<[u8; KEY_SIZE], IdentityError> {
    let mut key = [0u8; KEY_SIZE];
    hex::decode_to_slice(public_key, &mut key)
        .map_err(|e| IdentityError::InvalidPublicKey(e.to_string()))?;
    Ok(key)
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        // The network is a function of the encoded string.
        self.address == other.address
    }
}

impl std::hash::Hash for Address {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.address.hash(state);
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({}, {})", self.address, self.network_type)
    }
}

impl Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.address)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_encoded(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUBLIC_KEY: &str = "321DE652C4D3362FC2DDF7800F6582F4A10CFEA134B81F8AB6E4BE78BBA4D18E";

    #[test]
    fn known_vector_mijin_test() {
        let address = Address::from_public_key(PUBLIC_KEY, NetworkType::MijinTest).unwrap();
        assert_eq!(address.as_str(), "SBFBW6TUGLEWQIBCMTBMXXQORZKUP3WTVVTOKK5M");
        assert_eq!(address.network_type(), NetworkType::MijinTest);
    }

    #[test]
    fn known_vectors_all_networks() {
        let expected = [
            (NetworkType::Mijin, "MBFBW6TUGLEWQIBCMTBMXXQORZKUP3WTVWRD37XA"),
            (NetworkType::Public, "XBFBW6TUGLEWQIBCMTBMXXQORZKUP3WTVWRROM5Z"),
            (NetworkType::PublicTest, "VBFBW6TUGLEWQIBCMTBMXXQORZKUP3WTVX36ZFE7"),
            (NetworkType::Private, "ZBFBW6TUGLEWQIBCMTBMXXQORZKUP3WTVVZ4UIJX"),
            (NetworkType::PrivateTest, "WBFBW6TUGLEWQIBCMTBMXXQORZKUP3WTVXOYVNWP"),
        ];
        for (network, encoded) in expected {
            let address = Address::from_public_key(PUBLIC_KEY, network).unwrap();
            assert_eq!(address.as_str(), encoded);
            assert!(address.as_str().starts_with(network.prefix()));
        }
    }

    #[test]
    fn lower_case_key_gives_same_address() {
        let upper = Address::from_public_key(PUBLIC_KEY, NetworkType::MijinTest).unwrap();
        let lower =
            Address::from_public_key(&PUBLIC_KEY.to_lowercase(), NetworkType::MijinTest).unwrap();
        assert_eq!(upper, lower);
    }

    #[test]
    fn one_byte_change_changes_address() {
        let mut altered = PUBLIC_KEY.to_string();
        altered.replace_range(0..2, "33");
        let a = Address::from_public_key(PUBLIC_KEY, NetworkType::MijinTest).unwrap();
        let b = Address::from_public_key(&altered, NetworkType::MijinTest).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_keys_rejected() {
        for key in ["", "ABC", &PUBLIC_KEY[..63], &PUBLIC_KEY[..62], "ZZ"] {
            assert!(matches!(
                Address::from_public_key(key, NetworkType::MijinTest),
                Err(IdentityError::InvalidPublicKey(_))
            ));
        }
    }

    #[test]
    fn raw_hex_matches_node_owner_address() {
        let address = Address::from_public_key(PUBLIC_KEY, NetworkType::MijinTest).unwrap();
        assert_eq!(
            address.to_hex(),
            "904A1B7A7432C968202264C2CBDE0E8E5547EED3AD66E52BAC"
        );
        assert_eq!(
            Address::from_hex("904A1B7A7432C968202264C2CBDE0E8E5547EED3AD66E52BAC").unwrap(),
            address
        );
    }

    #[test]
    fn parse_pretty_and_lower_case() {
        let address = Address::from_public_key(PUBLIC_KEY, NetworkType::MijinTest).unwrap();
        let pretty = address.pretty();
        assert_eq!(pretty, "SBFBW6-TUGLEW-QIBCMT-BMXXQO-RZKUP3-WTVVTO-KK5M");
        assert_eq!(Address::from_encoded(&pretty).unwrap(), address);
        assert_eq!(
            Address::from_encoded(&address.as_str().to_lowercase()).unwrap(),
            address
        );
    }

    #[test]
    fn corrupted_checksum_rejected() {
        let mut encoded = "SBFBW6TUGLEWQIBCMTBMXXQORZKUP3WTVVTOKK5M".to_string();
        encoded.replace_range(39..40, "A");
        assert!(matches!(
            Address::from_encoded(&encoded),
            Err(IdentityError::InvalidAddress(_))
        ));
    }

    #[test]
    fn wrong_length_rejected() {
        assert!(Address::from_encoded("SBFBW6TUGLEW").is_err());
    }

    #[test]
    fn serde_as_string() {
        let address = Address::from_public_key(PUBLIC_KEY, NetworkType::MijinTest).unwrap();
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, "\"SBFBW6TUGLEWQIBCMTBMXXQORZKUP3WTVVTOKK5M\"");
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, address);
    }
}
