//! Public accounts: a key paired with its derived address.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::address::decode_public_key;
use super::{Address, IdentityError, NetworkType};
use crate::config::KEY_SIZE;

/// A public key and the address it derives on one network.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicAccount {
    #[serde(with = "crate::transaction::types::hex_key")]
    public_key: [u8; KEY_SIZE],
    address: Address,
}

impl PublicAccount {
    /// Builds an account from a hex public key.
    pub fn from_public_key(public_key: &str, network_type: NetworkType) -> Result<Self, IdentityError> {
        let key = decode_public_key(public_key)?;
        Ok(Self::from_public_key_bytes(key, network_type))
    }

    pub fn from_public_key_bytes(public_key: [u8; KEY_SIZE], network_type: NetworkType) -> Self {
        Self {
            address: Address::from_public_key_bytes(&public_key, network_type),
            public_key,
        }
    }

    pub fn public_key(&self) -> &[u8; KEY_SIZE] {
        &self.public_key
    }

    /// Upper-case hex, the form the REST API returns.
    pub fn public_key_hex(&self) -> String {
        hex::encode_upper(self.public_key)
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn network_type(&self) -> NetworkType {
        self.address.network_type()
    }
}

impl fmt::Debug for PublicAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicAccount")
            .field("public_key", &self.public_key_hex())
            .field("address", &self.address.as_str())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_carries_derived_address() {
        let account = PublicAccount::from_public_key(
            "321de652c4d3362fc2ddf7800f6582f4a10cfea134b81f8ab6e4be78bba4d18e",
            NetworkType::MijinTest,
        )
        .unwrap();
        assert_eq!(
            account.public_key_hex(),
            "321DE652C4D3362FC2DDF7800F6582F4A10CFEA134B81F8AB6E4BE78BBA4D18E"
        );
        assert_eq!(
            account.address().as_str(),
            "SBFBW6TUGLEWQIBCMTBMXXQORZKUP3WTVVTOKK5M"
        );
        assert_eq!(account.network_type(), NetworkType::MijinTest);
    }

    #[test]
    fn bad_key_is_rejected() {
        assert!(PublicAccount::from_public_key("00", NetworkType::Mijin).is_err());
    }
}
