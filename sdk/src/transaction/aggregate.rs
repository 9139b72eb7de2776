//! Aggregate transactions.
//!
//! An aggregate wraps inner transactions in their embedded form and
//! collects cosignatures from the accounts those inner transactions need:
//!
//! ```text
//! header (122) | payload size u32 | embedded tx... | (signer 32, signature 64)...
//! ```
//!
//! A complete aggregate carries every cosignature at announce time. A bonded
//! one is announced first and gathers cosignatures on chain.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::buffer::{TransactionReader, TransactionWriter};
use super::dispatch;
use super::dto::{self, TransactionHeaderDto};
use super::header::{AbstractTransaction, Deadline, TransactionInfo};
use super::types::{EntityType, Signature};
use super::{Transaction, TransactionBody, TransactionError};
use crate::config::{
    AGGREGATE_BONDED_HEADER_SIZE, AGGREGATE_BONDED_VERSION, AGGREGATE_COMPLETED_VERSION,
    COSIGNATURE_SIZE, EMBEDDED_SIZE_REDUCTION, TRANSACTION_HEADER_SIZE,
};
use crate::identity::{NetworkType, PublicAccount};

/// A cosigner and its signature over the aggregate hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateCosignature {
    pub signer: PublicAccount,
    pub signature: Signature,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CosignatureDto {
    pub signer: String,
    pub signature: String,
}

/// A complete or bonded aggregate.
///
/// Inner transactions are only added through validating constructors, so
/// every encoded aggregate decodes again.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateTransaction {
    pub header: AbstractTransaction,
    inner_transactions: Vec<Transaction>,
    pub cosignatures: Vec<AggregateCosignature>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateDto {
    #[serde(flatten)]
    pub header: TransactionHeaderDto,
    #[serde(default)]
    pub transactions: Vec<serde_json::Value>,
    #[serde(default)]
    pub cosignatures: Vec<CosignatureDto>,
}

impl AggregateTransaction {
    /// An aggregate whose cosignatures are all attached before announcing.
    pub fn new_complete(
        deadline: Deadline,
        inner_transactions: Vec<Transaction>,
        network_type: NetworkType,
    ) -> Result<Self, TransactionError> {
        Self::new(
            EntityType::AggregateCompleted,
            AGGREGATE_COMPLETED_VERSION,
            deadline,
            inner_transactions,
            network_type,
        )
    }

    /// An aggregate that collects cosignatures after it is announced.
    pub fn new_bonded(
        deadline: Deadline,
        inner_transactions: Vec<Transaction>,
        network_type: NetworkType,
    ) -> Result<Self, TransactionError> {
        Self::new(
            EntityType::AggregateBonded,
            AGGREGATE_BONDED_VERSION,
            deadline,
            inner_transactions,
            network_type,
        )
    }

    fn new(
        entity_type: EntityType,
        version: u32,
        deadline: Deadline,
        inner_transactions: Vec<Transaction>,
        network_type: NetworkType,
    ) -> Result<Self, TransactionError> {
        if inner_transactions.is_empty() {
            return Err(TransactionError::validation(
                "aggregate needs at least one inner transaction",
            ));
        }
        for (i, tx) in inner_transactions.iter().enumerate() {
            check_inner(i, tx)?;
        }

        Ok(Self {
            header: AbstractTransaction::new(entity_type, version, network_type, deadline),
            inner_transactions,
            cosignatures: Vec::new(),
        })
    }

    pub fn inner_transactions(&self) -> &[Transaction] {
        &self.inner_transactions
    }

    /// Appends an inner transaction under the same rules as the constructors.
    pub fn push_inner(&mut self, tx: Transaction) -> Result<(), TransactionError> {
        check_inner(self.inner_transactions.len(), &tx)?;
        self.inner_transactions.push(tx);
        Ok(())
    }

    pub fn is_bonded(&self) -> bool {
        self.header.entity_type == EntityType::AggregateBonded
    }

    /// Size of the embedded inner transactions, without cosignatures.
    pub fn inner_payload_size(&self) -> usize {
        self.inner_transactions
            .iter()
            .map(|tx| tx.size() - EMBEDDED_SIZE_REDUCTION)
            .sum()
    }
}

fn check_inner(index: usize, tx: &Transaction) -> Result<(), TransactionError> {
    if tx.entity_type().is_aggregate() {
        return Err(TransactionError::validation(format!(
            "inner transaction {index} is an aggregate"
        )));
    }
    if tx.header().signer.is_none() {
        return Err(TransactionError::validation(format!(
            "inner transaction {index} has no signer"
        )));
    }
    Ok(())
}

impl TransactionBody for AggregateTransaction {
    const ENTITY_TYPES: &'static [EntityType] =
        &[EntityType::AggregateCompleted, EntityType::AggregateBonded];
    type Dto = AggregateDto;

    fn header(&self) -> &AbstractTransaction {
        &self.header
    }

    fn header_mut(&mut self) -> &mut AbstractTransaction {
        &mut self.header
    }

    fn payload_size(&self) -> usize {
        AGGREGATE_BONDED_HEADER_SIZE - TRANSACTION_HEADER_SIZE
            + self.inner_payload_size()
            + COSIGNATURE_SIZE * self.cosignatures.len()
    }

    fn write_payload(&self, w: &mut TransactionWriter) -> Result<(), TransactionError> {
        let inner_size = u32::try_from(self.inner_payload_size())
            .map_err(|_| TransactionError::validation("aggregate payload too large"))?;
        w.put_u32(inner_size);
        for tx in &self.inner_transactions {
            tx.write_embedded(w)?;
        }
        for cosignature in &self.cosignatures {
            w.put_bytes(cosignature.signer.public_key());
            w.put_bytes(cosignature.signature.as_bytes());
        }
        Ok(())
    }

    fn read_payload(
        header: AbstractTransaction,
        r: &mut TransactionReader<'_>,
    ) -> Result<Self, TransactionError> {
        let inner_size = r.get_u32()? as usize;
        let mut inner = r.split(inner_size)?;

        let mut inner_transactions = Vec::new();
        while inner.remaining() > 0 {
            let size = inner.peek_u32()? as usize;
            let mut embedded = inner.split(size)?;
            let tx = dispatch::read_embedded(&mut embedded, size)?;
            trace!(entity_type = %tx.entity_type(), size, "decoded embedded transaction");
            inner_transactions.push(tx);
        }

        if r.remaining() % COSIGNATURE_SIZE != 0 {
            return Err(TransactionError::malformed(
                "cosignatures",
                format!("{} bytes is not a whole number of cosignatures", r.remaining()),
            ));
        }
        let mut cosignatures = Vec::with_capacity(r.remaining() / COSIGNATURE_SIZE);
        while r.remaining() > 0 {
            cosignatures.push(AggregateCosignature {
                signer: PublicAccount::from_public_key_bytes(r.get_key()?, header.network_type),
                signature: Signature(r.get_signature()?),
            });
        }

        Ok(Self {
            header,
            inner_transactions,
            cosignatures,
        })
    }

    fn to_dto(&self) -> Result<Self::Dto, TransactionError> {
        Ok(AggregateDto {
            header: self.header.to_dto(),
            transactions: self
                .inner_transactions
                .iter()
                .map(Transaction::to_json)
                .collect::<Result<Vec<_>, _>>()?,
            cosignatures: self
                .cosignatures
                .iter()
                .map(|c| CosignatureDto {
                    signer: c.signer.public_key_hex(),
                    signature: c.signature.to_hex(),
                })
                .collect(),
        })
    }

    fn from_dto(dto: Self::Dto, info: Option<TransactionInfo>) -> Result<Self, TransactionError> {
        let header = AbstractTransaction::from_dto(&dto.header, info)?;

        let inner_transactions = dto
            .transactions
            .into_iter()
            .map(|value| {
                let tx = dispatch::map_transaction(value)?;
                if tx.entity_type().is_aggregate() {
                    return Err(TransactionError::malformed(
                        "transactions",
                        "aggregates cannot nest",
                    ));
                }
                Ok(tx)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let cosignatures = dto
            .cosignatures
            .iter()
            .map(|c| {
                Ok(AggregateCosignature {
                    signer: dto::parse_account("cosignatures.signer", &c.signer, header.network_type)?,
                    signature: c
                        .signature
                        .parse()
                        .map_err(|e| TransactionError::malformed("cosignatures.signature", e))?,
                })
            })
            .collect::<Result<Vec<_>, TransactionError>>()?;

        Ok(Self {
            header,
            inner_transactions,
            cosignatures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::storage::{File, FilesDepositTransaction, JoinToDriveTransaction};
    use crate::transaction::types::Hash;

    const KEY: &str = "321DE652C4D3362FC2DDF7800F6582F4A10CFEA134B81F8AB6E4BE78BBA4D18E";
    const NETWORK: NetworkType = NetworkType::MijinTest;

    fn account() -> PublicAccount {
        PublicAccount::from_public_key(KEY, NETWORK).unwrap()
    }

    fn inner() -> Vec<Transaction> {
        let join = JoinToDriveTransaction::new(Deadline::from_millis(5), account(), NETWORK);
        let deposit = FilesDepositTransaction::new(
            Deadline::from_millis(5),
            account(),
            vec![File {
                file_hash: Hash([7; 32]),
            }],
            NETWORK,
        )
        .unwrap();
        vec![
            Transaction::from(join).to_aggregate(account()),
            Transaction::from(deposit).to_aggregate(account()),
        ]
    }

    #[test]
    fn size_is_header_plus_embedded_plus_cosignatures() {
        let mut aggregate =
            AggregateTransaction::new_complete(Deadline::from_millis(1), inner(), NETWORK).unwrap();
        assert_eq!(aggregate.size(), 126 + (154 - 80) + (188 - 80));

        aggregate.cosignatures.push(AggregateCosignature {
            signer: account(),
            signature: Signature([3; 64]),
        });
        // Recomputed after mutation.
        assert_eq!(aggregate.size(), 126 + 74 + 108 + 96);
        assert_eq!(aggregate.to_bytes().unwrap().len(), aggregate.size());
    }

    #[test]
    fn binary_round_trip_with_cosignature() {
        let mut aggregate =
            AggregateTransaction::new_bonded(Deadline::from_millis(1), inner(), NETWORK).unwrap();
        aggregate.cosignatures.push(AggregateCosignature {
            signer: account(),
            signature: Signature([3; 64]),
        });
        let bytes = aggregate.to_bytes().unwrap();
        let decoded = AggregateTransaction::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, aggregate);
        assert!(decoded.is_bonded());
    }

    #[test]
    fn json_round_trip() {
        let aggregate =
            AggregateTransaction::new_complete(Deadline::from_millis(1), inner(), NETWORK).unwrap();
        let json = aggregate.to_json().unwrap();
        assert_eq!(json["transaction"]["transactions"].as_array().unwrap().len(), 2);
        assert_eq!(AggregateTransaction::from_json(json).unwrap(), aggregate);
    }

    #[test]
    fn rejects_empty_and_unsigned_inner() {
        assert!(AggregateTransaction::new_complete(Deadline::from_millis(1), vec![], NETWORK).is_err());

        let unsigned: Transaction =
            JoinToDriveTransaction::new(Deadline::from_millis(1), account(), NETWORK).into();
        assert!(
            AggregateTransaction::new_complete(Deadline::from_millis(1), vec![unsigned], NETWORK)
                .is_err()
        );
    }

    #[test]
    fn push_inner_keeps_aggregate_decodable() {
        let mut aggregate =
            AggregateTransaction::new_complete(Deadline::from_millis(1), inner(), NETWORK).unwrap();

        let nested: Transaction = aggregate.clone().into();
        assert!(matches!(
            aggregate.push_inner(nested.to_aggregate(account())),
            Err(TransactionError::Validation { .. })
        ));
        let unsigned: Transaction =
            JoinToDriveTransaction::new(Deadline::from_millis(1), account(), NETWORK).into();
        assert!(matches!(
            aggregate.push_inner(unsigned),
            Err(TransactionError::Validation { .. })
        ));
        assert_eq!(aggregate.inner_transactions().len(), 2);

        let join = JoinToDriveTransaction::new(Deadline::from_millis(1), account(), NETWORK);
        aggregate
            .push_inner(Transaction::from(join).to_aggregate(account()))
            .unwrap();
        assert_eq!(aggregate.inner_transactions().len(), 3);
        let bytes = aggregate.to_bytes().unwrap();
        assert_eq!(AggregateTransaction::from_bytes(&bytes).unwrap(), aggregate);
    }

    #[test]
    fn ragged_cosignature_block_rejected() {
        let aggregate =
            AggregateTransaction::new_complete(Deadline::from_millis(1), inner(), NETWORK).unwrap();
        let mut bytes = aggregate.to_bytes().unwrap();
        bytes.extend_from_slice(&[0u8; 10]);
        let size = bytes.len() as u32;
        bytes[0..4].copy_from_slice(&size.to_le_bytes());
        assert!(matches!(
            AggregateTransaction::from_bytes(&bytes),
            Err(TransactionError::MalformedField { ref field, .. }) if field == "cosignatures"
        ));
    }
}
