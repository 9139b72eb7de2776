//! Transaction signing through an external signer.
//!
//! The SDK never holds private keys. A [`TransactionSigner`] produces the
//! Ed25519 signature; this module decides what gets signed, where the
//! signature lands in the payload and how the transaction hash is derived.
//!
//! ```text
//! signed data = generation_hash ++ bytes[100..]
//! hash        = sha3_256(signature[0..32] ++ signer ++ generation_hash ++ bytes[100..])
//! ```

use serde::Serialize;
use tracing::debug;

use super::types::{EntityType, Hash, Signature};
use super::{Transaction, TransactionError};
use crate::config::{
    COSIGNATURE_SIZE, KEY_SIZE, SIGNABLE_OFFSET, SIGNATURE_OFFSET, SIGNATURE_SIZE, SIGNER_OFFSET,
};
use crate::crypto::hash::sha3_256_multi;

/// Holder of a private key that can sign on the SDK's behalf.
pub trait TransactionSigner {
    fn public_key(&self) -> [u8; KEY_SIZE];

    fn sign(&self, message: &[u8]) -> [u8; SIGNATURE_SIZE];
}

/// A payload ready to announce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedTransaction {
    pub entity_type: EntityType,
    /// Upper-case hex of the signed bytes.
    pub payload: String,
    pub hash: Hash,
}

/// A cosignature over an announced aggregate bonded transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CosignatureSignedTransaction {
    pub parent_hash: Hash,
    pub signature: String,
    pub signer: String,
}

/// The catapult transaction hash of a signed payload.
pub fn transaction_hash(payload: &[u8], generation_hash: &Hash) -> Result<Hash, TransactionError> {
    if payload.len() < SIGNABLE_OFFSET {
        return Err(TransactionError::Truncated {
            offset: 0,
            needed: SIGNABLE_OFFSET,
            available: payload.len(),
        });
    }
    let digest = sha3_256_multi(&[
        &payload[SIGNATURE_OFFSET..SIGNATURE_OFFSET + SIGNATURE_SIZE / 2],
        &payload[SIGNER_OFFSET..SIGNABLE_OFFSET],
        generation_hash.as_bytes(),
        &payload[SIGNABLE_OFFSET..],
    ]);
    Ok(Hash(digest))
}

fn sign_payload<S: TransactionSigner + ?Sized>(
    mut payload: Vec<u8>,
    signer: &S,
    generation_hash: &Hash,
) -> Vec<u8> {
    let mut message = Vec::with_capacity(generation_hash.as_bytes().len() + payload.len());
    message.extend_from_slice(generation_hash.as_bytes());
    message.extend_from_slice(&payload[SIGNABLE_OFFSET..]);
    let signature = signer.sign(&message);

    payload[SIGNATURE_OFFSET..SIGNER_OFFSET].copy_from_slice(&signature);
    payload[SIGNER_OFFSET..SIGNABLE_OFFSET].copy_from_slice(&signer.public_key());
    payload
}

/// Signs `tx` for the network identified by `generation_hash`.
///
/// The transaction itself is left untouched; the signature and signer are
/// written into the returned payload only.
pub fn sign_transaction<S: TransactionSigner + ?Sized>(
    tx: &Transaction,
    signer: &S,
    generation_hash: &Hash,
) -> Result<SignedTransaction, TransactionError> {
    let payload = sign_payload(tx.to_bytes()?, signer, generation_hash);
    let hash = transaction_hash(&payload, generation_hash)?;
    debug!(entity_type = %tx.entity_type(), %hash, "signed transaction");

    Ok(SignedTransaction {
        entity_type: tx.entity_type(),
        payload: hex::encode_upper(payload),
        hash,
    })
}

/// Signs an aggregate and appends every cosigner's signature over its hash,
/// so a complete aggregate can be announced in one step.
pub fn sign_with_cosignatories<S: TransactionSigner + ?Sized>(
    tx: &Transaction,
    signer: &S,
    cosignatories: &[&S],
    generation_hash: &Hash,
) -> Result<SignedTransaction, TransactionError> {
    if !tx.entity_type().is_aggregate() {
        return Err(TransactionError::EntityTypeMismatch {
            expected: EntityType::AggregateCompleted,
            actual: tx.entity_type(),
        });
    }

    let mut payload = sign_payload(tx.to_bytes()?, signer, generation_hash);
    let hash = transaction_hash(&payload, generation_hash)?;

    for cosigner in cosignatories {
        payload.extend_from_slice(&cosigner.public_key());
        payload.extend_from_slice(&cosigner.sign(hash.as_bytes()));
    }
    let size = u32::try_from(payload.len())
        .map_err(|_| TransactionError::validation("signed aggregate too large"))?;
    payload[..4].copy_from_slice(&size.to_le_bytes());
    debug_assert_eq!(
        payload.len(),
        tx.size() + COSIGNATURE_SIZE * cosignatories.len()
    );

    Ok(SignedTransaction {
        entity_type: tx.entity_type(),
        payload: hex::encode_upper(payload),
        hash,
    })
}

/// Cosigns an aggregate bonded transaction announced elsewhere.
pub fn cosign<S: TransactionSigner + ?Sized>(
    aggregate_hash: &Hash,
    signer: &S,
) -> CosignatureSignedTransaction {
    let signature = Signature(signer.sign(aggregate_hash.as_bytes()));
    CosignatureSignedTransaction {
        parent_hash: *aggregate_hash,
        signature: signature.to_hex(),
        signer: hex::encode_upper(signer.public_key()),
    }
}
