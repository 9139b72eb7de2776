//! JSON shapes returned by the node's REST API.
//!
//! Every transaction arrives as `{ "transaction": {...}, "meta": {...} }`.
//! The `meta` block is absent for unconfirmed transactions. Keys and hashes
//! are hex strings in either case; 64-bit values are `[low, high]` pairs.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::header::TransactionInfo;
use super::types::Hash;
use super::TransactionError;
use crate::config::KEY_SIZE;
use crate::identity::{NetworkType, PublicAccount};
use crate::uint64::Uint64Dto;

/// `{ "transaction": T, "meta": ... }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionEnvelope<T> {
    pub transaction: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<TransactionInfoDto>,
}

/// Header fields flattened into every `transaction` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionHeaderDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signer: Option<String>,
    pub version: u32,
    #[serde(rename = "type")]
    pub entity_type: u16,
    #[serde(default)]
    pub max_fee: Uint64Dto,
    #[serde(default)]
    pub deadline: Uint64Dto,
}

/// The `meta` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInfoDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<Uint64Dto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merkle_component_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate_id: Option<String>,
}

impl From<&TransactionInfo> for TransactionInfoDto {
    fn from(info: &TransactionInfo) -> Self {
        Self {
            height: Some(info.height.into()),
            index: Some(info.index),
            id: Some(info.id.clone()),
            hash: info.hash.map(|h| h.to_hex()),
            merkle_component_hash: info.merkle_component_hash.map(|h| h.to_hex()),
            aggregate_hash: info.aggregate_hash.map(|h| h.to_hex()),
            aggregate_id: info.aggregate_id.clone(),
        }
    }
}

/// Checks for the `transaction` object before handing the value to serde,
/// so its absence is reported by name.
pub fn parse_envelope<T: DeserializeOwned>(
    value: serde_json::Value,
) -> Result<TransactionEnvelope<T>, TransactionError> {
    match value.get("transaction") {
        Some(serde_json::Value::Object(_)) => Ok(serde_json::from_value(value)?),
        Some(_) => Err(TransactionError::malformed("transaction", "not an object")),
        None => Err(TransactionError::MissingField("transaction".to_string())),
    }
}

/// Decodes a 32-byte hex key.
pub fn parse_key(field: &str, value: &str) -> Result<[u8; KEY_SIZE], TransactionError> {
    let mut key = [0u8; KEY_SIZE];
    hex::decode_to_slice(value, &mut key).map_err(|e| TransactionError::malformed(field, e))?;
    Ok(key)
}

/// Decodes a hex key and derives its account on `network_type`.
pub fn parse_account(
    field: &str,
    value: &str,
    network_type: NetworkType,
) -> Result<PublicAccount, TransactionError> {
    let key = parse_key(field, value)?;
    Ok(PublicAccount::from_public_key_bytes(key, network_type))
}

pub fn parse_hash(field: &str, value: &str) -> Result<Hash, TransactionError> {
    value.parse().map_err(|e| TransactionError::malformed(field, e))
}
