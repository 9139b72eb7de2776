//! Routes a raw payload to the decoder for its type slot.
//!
//! A payload is undetermined until its discriminant is read; after that
//! exactly one decoder runs. Unknown discriminants fail with
//! [`TransactionError::UnsupportedTransactionType`] and nothing is
//! half-decoded.

use serde_json::Value;
use tracing::{debug, trace};

use super::buffer::TransactionReader;
use super::header::AbstractTransaction;
use super::types::EntityType;
use super::*;
use crate::config::TYPE_OFFSET;

fn resolve(raw_type: u16) -> Result<EntityType, TransactionError> {
    EntityType::try_from(raw_type).map_err(|e| TransactionError::UnsupportedTransactionType(e.0))
}

/// Reads `transaction.type` from a JSON envelope.
fn json_entity_type(value: &Value) -> Result<EntityType, TransactionError> {
    let transaction = value
        .get("transaction")
        .ok_or_else(|| TransactionError::MissingField("transaction".to_string()))?;
    let raw_type = transaction
        .get("type")
        .ok_or_else(|| TransactionError::MissingField("transaction.type".to_string()))?
        .as_u64()
        .ok_or_else(|| TransactionError::malformed("transaction.type", "not an integer"))?;
    let raw_type = u16::try_from(raw_type)
        .map_err(|_| TransactionError::malformed("transaction.type", "exceeds u16"))?;
    resolve(raw_type)
}

/// Maps one node JSON envelope onto its concrete transaction.
pub fn map_transaction(value: Value) -> Result<Transaction, TransactionError> {
    let entity_type = json_entity_type(&value)?;
    trace!(%entity_type, "mapping transaction json");

    let tx = match entity_type {
        EntityType::PrepareDrive => PrepareDriveTransaction::from_json(value)?.into(),
        EntityType::JoinToDrive => JoinToDriveTransaction::from_json(value)?.into(),
        EntityType::DriveFileSystem => DriveFileSystemTransaction::from_json(value)?.into(),
        EntityType::FilesDeposit => FilesDepositTransaction::from_json(value)?.into(),
        EntityType::EndDrive => EndDriveTransaction::from_json(value)?.into(),
        EntityType::DriveFilesReward => DriveFilesRewardTransaction::from_json(value)?.into(),
        EntityType::StartDriveVerification => {
            StartDriveVerificationTransaction::from_json(value)?.into()
        }
        EntityType::EndDriveVerification => {
            EndDriveVerificationTransaction::from_json(value)?.into()
        }
        EntityType::StartFileDownload => StartFileDownloadTransaction::from_json(value)?.into(),
        EntityType::EndFileDownload => EndFileDownloadTransaction::from_json(value)?.into(),
        EntityType::AggregateCompleted | EntityType::AggregateBonded => {
            AggregateTransaction::from_json(value)?.into()
        }
    };
    Ok(tx)
}

/// Parses and maps a JSON document holding one envelope.
pub fn map_transaction_str(json: &str) -> Result<Transaction, TransactionError> {
    map_transaction(serde_json::from_str(json)?)
}

/// Maps a JSON array of envelopes, in order. The first failure wins.
pub fn map_transactions(value: Value) -> Result<Vec<Transaction>, TransactionError> {
    let entries = match value {
        Value::Array(entries) => entries,
        _ => return Err(TransactionError::malformed("transactions", "not an array")),
    };
    debug!(count = entries.len(), "mapping transaction list");
    entries.into_iter().map(map_transaction).collect()
}

/// Decodes a full binary payload by reading its type slot.
pub fn map_transaction_bytes(bytes: &[u8]) -> Result<Transaction, TransactionError> {
    if bytes.len() < TYPE_OFFSET + 2 {
        return Err(TransactionError::Truncated {
            offset: 0,
            needed: TYPE_OFFSET + 2,
            available: bytes.len(),
        });
    }
    let entity_type = resolve(u16::from_le_bytes([bytes[TYPE_OFFSET], bytes[TYPE_OFFSET + 1]]))?;
    trace!(%entity_type, len = bytes.len(), "decoding transaction bytes");

    let tx = match entity_type {
        EntityType::PrepareDrive => PrepareDriveTransaction::from_bytes(bytes)?.into(),
        EntityType::JoinToDrive => JoinToDriveTransaction::from_bytes(bytes)?.into(),
        EntityType::DriveFileSystem => DriveFileSystemTransaction::from_bytes(bytes)?.into(),
        EntityType::FilesDeposit => FilesDepositTransaction::from_bytes(bytes)?.into(),
        EntityType::EndDrive => EndDriveTransaction::from_bytes(bytes)?.into(),
        EntityType::DriveFilesReward => DriveFilesRewardTransaction::from_bytes(bytes)?.into(),
        EntityType::StartDriveVerification => {
            StartDriveVerificationTransaction::from_bytes(bytes)?.into()
        }
        EntityType::EndDriveVerification => {
            EndDriveVerificationTransaction::from_bytes(bytes)?.into()
        }
        EntityType::StartFileDownload => StartFileDownloadTransaction::from_bytes(bytes)?.into(),
        EntityType::EndFileDownload => EndFileDownloadTransaction::from_bytes(bytes)?.into(),
        EntityType::AggregateCompleted | EntityType::AggregateBonded => {
            AggregateTransaction::from_bytes(bytes)?.into()
        }
    };
    Ok(tx)
}

/// Decodes one embedded transaction of `size` bytes from inside an
/// aggregate.
pub(crate) fn read_embedded(
    r: &mut TransactionReader<'_>,
    size: usize,
) -> Result<Transaction, TransactionError> {
    let header = AbstractTransaction::read_embedded(r, size)?;
    let tx = match header.entity_type {
        EntityType::PrepareDrive => PrepareDriveTransaction::read_payload(header, r)?.into(),
        EntityType::JoinToDrive => JoinToDriveTransaction::read_payload(header, r)?.into(),
        EntityType::DriveFileSystem => DriveFileSystemTransaction::read_payload(header, r)?.into(),
        EntityType::FilesDeposit => FilesDepositTransaction::read_payload(header, r)?.into(),
        EntityType::EndDrive => EndDriveTransaction::read_payload(header, r)?.into(),
        EntityType::DriveFilesReward => DriveFilesRewardTransaction::read_payload(header, r)?.into(),
        EntityType::StartDriveVerification => {
            StartDriveVerificationTransaction::read_payload(header, r)?.into()
        }
        EntityType::EndDriveVerification => {
            EndDriveVerificationTransaction::read_payload(header, r)?.into()
        }
        EntityType::StartFileDownload => {
            StartFileDownloadTransaction::read_payload(header, r)?.into()
        }
        EntityType::EndFileDownload => EndFileDownloadTransaction::read_payload(header, r)?.into(),
        EntityType::AggregateCompleted | EntityType::AggregateBonded => {
            return Err(TransactionError::malformed(
                "transactions",
                "aggregates cannot nest",
            ));
        }
    };
    r.expect_end()?;
    Ok(tx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{NetworkType, PublicAccount};
    use serde_json::json;

    const KEY: &str = "321DE652C4D3362FC2DDF7800F6582F4A10CFEA134B81F8AB6E4BE78BBA4D18E";

    fn end_drive() -> EndDriveTransaction {
        let drive = PublicAccount::from_public_key(KEY, NetworkType::MijinTest).unwrap();
        EndDriveTransaction::new(Deadline::from_millis(9), drive, NetworkType::MijinTest)
    }

    #[test]
    fn json_routes_by_type() {
        let json = end_drive().to_json().unwrap();
        let tx = map_transaction(json).unwrap();
        assert_eq!(tx.entity_type(), EntityType::EndDrive);
        assert_eq!(tx, Transaction::EndDrive(end_drive()));
    }

    #[test]
    fn bytes_route_by_type_slot() {
        let bytes = end_drive().to_bytes().unwrap();
        assert_eq!(
            map_transaction_bytes(&bytes).unwrap(),
            Transaction::EndDrive(end_drive())
        );
    }

    #[test]
    fn unknown_json_type_is_unsupported() {
        let mut json = end_drive().to_json().unwrap();
        json["transaction"]["type"] = json!(0xFFFF);
        assert!(matches!(
            map_transaction(json),
            Err(TransactionError::UnsupportedTransactionType(0xFFFF))
        ));
    }

    #[test]
    fn unknown_binary_type_is_unsupported() {
        let mut bytes = end_drive().to_bytes().unwrap();
        bytes[TYPE_OFFSET] = 0xFF;
        bytes[TYPE_OFFSET + 1] = 0xFF;
        assert!(matches!(
            map_transaction_bytes(&bytes),
            Err(TransactionError::UnsupportedTransactionType(0xFFFF))
        ));
    }

    #[test]
    fn missing_transaction_object() {
        assert!(matches!(
            map_transaction(json!({ "meta": { "height": [1, 0] } })),
            Err(TransactionError::MissingField(ref f)) if f == "transaction"
        ));
        assert!(matches!(
            map_transaction(json!({ "transaction": { "version": 1 } })),
            Err(TransactionError::MissingField(ref f)) if f == "transaction.type"
        ));
    }

    #[test]
    fn list_preserves_order_and_meta() {
        let mut first = end_drive().to_json().unwrap();
        first["meta"] = json!({ "height": [7, 0], "index": 2, "id": "abc" });
        let second = end_drive().to_json().unwrap();

        let txs = map_transactions(json!([first, second])).unwrap();
        assert_eq!(txs.len(), 2);
        let info = txs[0].header().info.as_ref().unwrap();
        assert_eq!(info.height.0, 7);
        assert_eq!(info.index, 2);
        assert!(txs[0].header().is_confirmed());
        assert!(txs[1].header().info.is_none());
    }

    #[test]
    fn short_buffer_is_truncated() {
        assert!(matches!(
            map_transaction_bytes(&[0u8; 50]),
            Err(TransactionError::Truncated { .. })
        ));
    }
}
