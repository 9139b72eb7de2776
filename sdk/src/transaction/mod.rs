//! # Transaction Module
//!
//! Construction, binary encoding, JSON mapping and signing of chain
//! transactions. Every drive-lifecycle operation and every aggregate is
//! represented as one case of [`Transaction`].
//!
//! ## Architecture
//!
//! ```text
//! types.rs     Entity types, hashes, signatures and wide scalars
//! buffer.rs    Canonical little-endian writer and bounds-checked reader
//! header.rs    AbstractTransaction, Deadline, TransactionInfo
//! dto.rs       JSON envelope and header DTOs, field parsing helpers
//! storage.rs   The ten drive-lifecycle variants
//! aggregate.rs Aggregate complete/bonded containers and cosignatures
//! dispatch.rs  Type slot to decoder routing, JSON and binary
//! signing.rs   Signable bytes, signed payloads and transaction hashes
//! ```
//!
//! ## Lifecycle
//!
//! 1. **Build** with a variant constructor, which validates its fields.
//! 2. **Encode** with [`TransactionBody::to_bytes`]; the announced size is
//!    checked against the written length.
//! 3. **Sign** with [`sign_transaction`] through an external signer.
//! 4. **Decode** node responses with [`map_transaction`] or raw payloads
//!    with [`map_transaction_bytes`].

pub mod aggregate;
pub mod buffer;
pub mod dispatch;
pub mod dto;
pub mod header;
pub mod signing;
pub mod storage;
pub mod types;

pub use aggregate::{AggregateCosignature, AggregateTransaction};
pub use dispatch::{map_transaction, map_transaction_bytes, map_transaction_str, map_transactions};
pub use header::{AbstractTransaction, Deadline, TransactionInfo};
pub use signing::{
    cosign, sign_transaction, sign_with_cosignatories, transaction_hash,
    CosignatureSignedTransaction, SignedTransaction, TransactionSigner,
};
pub use storage::{
    recover_new_root_hash, AddAction, DownloadFile, DriveFileSystemTransaction,
    DriveFilesRewardTransaction, EndDriveTransaction, EndDriveVerificationTransaction,
    EndFileDownloadTransaction, FailureVerification, File, FilesDepositTransaction,
    JoinToDriveTransaction, PrepareDriveTransaction, RemoveAction,
    StartDriveVerificationTransaction, StartFileDownloadTransaction, UploadInfo,
};
pub use types::{Amount, Duration, EntityType, Hash, Height, Signature, StorageSize};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::config::{EMBEDDED_SIZE_REDUCTION, SIGNABLE_OFFSET, TRANSACTION_HEADER_SIZE};
use crate::identity::{IdentityError, PublicAccount};
use buffer::{TransactionReader, TransactionWriter};
use dto::{TransactionEnvelope, TransactionInfoDto};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while building, encoding or decoding transactions.
#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("validation failed: {reason}")]
    Validation { reason: String },

    #[error("malformed field `{field}`: {reason}")]
    MalformedField { field: String, reason: String },

    #[error("missing field `{0}`")]
    MissingField(String),

    #[error("unsupported transaction type 0x{0:04X}")]
    UnsupportedTransactionType(u16),

    #[error("expected a {expected} transaction, found {actual}")]
    EntityTypeMismatch {
        expected: EntityType,
        actual: EntityType,
    },

    #[error("size mismatch: announced {expected} bytes, found {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("truncated at offset {offset}: needed {needed} bytes, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("{count} trailing bytes at offset {offset}")]
    TrailingBytes { offset: usize, count: usize },

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error("json decode failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl TransactionError {
    pub(crate) fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(field: impl Into<String>, reason: impl ToString) -> Self {
        Self::MalformedField {
            field: field.into(),
            reason: reason.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// TransactionBody
// ---------------------------------------------------------------------------

/// Capabilities shared by every concrete transaction: expose the common
/// header, report the payload size, write and read the payload, and map to
/// and from the node's JSON shape.
///
/// The provided methods build the full and embedded byte forms on top of
/// these.
pub trait TransactionBody: Sized {
    /// Entity types this body decodes from.
    const ENTITY_TYPES: &'static [EntityType];

    /// The `transaction` object of the JSON envelope.
    type Dto: Serialize + DeserializeOwned;

    fn header(&self) -> &AbstractTransaction;

    fn header_mut(&mut self) -> &mut AbstractTransaction;

    /// Bytes after the common header.
    fn payload_size(&self) -> usize;

    fn write_payload(&self, w: &mut TransactionWriter) -> Result<(), TransactionError>;

    /// Reads the payload. The reader is bounded to this transaction.
    fn read_payload(
        header: AbstractTransaction,
        r: &mut TransactionReader<'_>,
    ) -> Result<Self, TransactionError>;

    fn to_dto(&self) -> Result<Self::Dto, TransactionError>;

    fn from_dto(dto: Self::Dto, info: Option<TransactionInfo>) -> Result<Self, TransactionError>;

    /// Total encoded size, header included.
    fn size(&self) -> usize {
        TRANSACTION_HEADER_SIZE + self.payload_size()
    }

    /// Canonical bytes. The signature slot is zero until signed.
    fn to_bytes(&self) -> Result<Vec<u8>, TransactionError> {
        let size = self.size();
        let mut w = TransactionWriter::with_capacity(size);
        self.header().write(&mut w, size)?;
        self.write_payload(&mut w)?;
        w.finish(size)
    }

    /// Bytes covered by the signature: everything after size, signature and
    /// signer.
    fn signable_bytes(&self) -> Result<Vec<u8>, TransactionError> {
        let mut bytes = self.to_bytes()?;
        Ok(bytes.split_off(SIGNABLE_OFFSET))
    }

    /// The form used inside an aggregate: no signature, fee or deadline.
    fn to_embedded_bytes(&self) -> Result<Vec<u8>, TransactionError> {
        let size = self.size() - EMBEDDED_SIZE_REDUCTION;
        let mut w = TransactionWriter::with_capacity(size);
        self.header().write_embedded(&mut w, size)?;
        self.write_payload(&mut w)?;
        w.finish(size)
    }

    /// Decodes a full payload of this exact type.
    fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut r = TransactionReader::new(bytes);
        let header = AbstractTransaction::read(&mut r, bytes.len())?;
        check_entity_type::<Self>(header.entity_type)?;
        let tx = Self::read_payload(header, &mut r)?;
        r.expect_end()?;
        Ok(tx)
    }

    /// Maps the node's JSON envelope onto this exact type.
    fn from_json(value: serde_json::Value) -> Result<Self, TransactionError> {
        let envelope: TransactionEnvelope<Self::Dto> = dto::parse_envelope(value)?;
        let info = envelope.meta.map(TransactionInfo::try_from).transpose()?;
        let tx = Self::from_dto(envelope.transaction, info)?;
        check_entity_type::<Self>(tx.header().entity_type)?;
        Ok(tx)
    }

    /// The JSON envelope, `meta` included when the header carries it.
    fn to_json(&self) -> Result<serde_json::Value, TransactionError> {
        let envelope = TransactionEnvelope {
            transaction: self.to_dto()?,
            meta: self.header().info.as_ref().map(TransactionInfoDto::from),
        };
        Ok(serde_json::to_value(envelope)?)
    }
}

fn check_entity_type<T: TransactionBody>(actual: EntityType) -> Result<(), TransactionError> {
    if T::ENTITY_TYPES.contains(&actual) {
        Ok(())
    } else {
        Err(TransactionError::EntityTypeMismatch {
            expected: T::ENTITY_TYPES[0],
            actual,
        })
    }
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// Every transaction kind the SDK encodes and decodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Transaction {
    PrepareDrive(PrepareDriveTransaction),
    JoinToDrive(JoinToDriveTransaction),
    DriveFileSystem(DriveFileSystemTransaction),
    FilesDeposit(FilesDepositTransaction),
    EndDrive(EndDriveTransaction),
    DriveFilesReward(DriveFilesRewardTransaction),
    StartDriveVerification(StartDriveVerificationTransaction),
    EndDriveVerification(EndDriveVerificationTransaction),
    StartFileDownload(StartFileDownloadTransaction),
    EndFileDownload(EndFileDownloadTransaction),
    Aggregate(AggregateTransaction),
}

/// Applies `$body` to the variant payload bound as `$tx`.
macro_rules! with_body {
    ($value:expr, $tx:ident => $body:expr) => {
        match $value {
            Transaction::PrepareDrive($tx) => $body,
            Transaction::JoinToDrive($tx) => $body,
            Transaction::DriveFileSystem($tx) => $body,
            Transaction::FilesDeposit($tx) => $body,
            Transaction::EndDrive($tx) => $body,
            Transaction::DriveFilesReward($tx) => $body,
            Transaction::StartDriveVerification($tx) => $body,
            Transaction::EndDriveVerification($tx) => $body,
            Transaction::StartFileDownload($tx) => $body,
            Transaction::EndFileDownload($tx) => $body,
            Transaction::Aggregate($tx) => $body,
        }
    };
}

impl Transaction {
    pub fn header(&self) -> &AbstractTransaction {
        with_body!(self, tx => tx.header())
    }

    pub fn header_mut(&mut self) -> &mut AbstractTransaction {
        with_body!(self, tx => tx.header_mut())
    }

    pub fn entity_type(&self) -> EntityType {
        self.header().entity_type
    }

    /// Total encoded size. For aggregates this walks the inner transactions
    /// on every call.
    pub fn size(&self) -> usize {
        with_body!(self, tx => tx.size())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, TransactionError> {
        with_body!(self, tx => tx.to_bytes())
    }

    pub fn signable_bytes(&self) -> Result<Vec<u8>, TransactionError> {
        with_body!(self, tx => tx.signable_bytes())
    }

    pub fn to_embedded_bytes(&self) -> Result<Vec<u8>, TransactionError> {
        with_body!(self, tx => tx.to_embedded_bytes())
    }

    pub(crate) fn write_embedded(&self, w: &mut TransactionWriter) -> Result<(), TransactionError> {
        with_body!(self, tx => {
            let size = tx.size() - EMBEDDED_SIZE_REDUCTION;
            tx.header().write_embedded(w, size)?;
            tx.write_payload(w)
        })
    }

    pub fn to_json(&self) -> Result<serde_json::Value, TransactionError> {
        with_body!(self, tx => tx.to_json())
    }

    /// Prepares this transaction for inclusion in an aggregate: sets the
    /// inner signer and clears the fields the embedded form drops.
    pub fn to_aggregate(mut self, signer: PublicAccount) -> Self {
        let header = self.header_mut();
        header.signer = Some(signer);
        header.signature = None;
        header.max_fee = Amount(0);
        header.deadline = Deadline::from_millis(0);
        header.info = None;
        self
    }
}

macro_rules! impl_from_variant {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Transaction {
                fn from(tx: $ty) -> Self {
                    Transaction::$variant(tx)
                }
            }
        )*
    };
}

impl_from_variant!(
    PrepareDrive(PrepareDriveTransaction),
    JoinToDrive(JoinToDriveTransaction),
    DriveFileSystem(DriveFileSystemTransaction),
    FilesDeposit(FilesDepositTransaction),
    EndDrive(EndDriveTransaction),
    DriveFilesReward(DriveFilesRewardTransaction),
    StartDriveVerification(StartDriveVerificationTransaction),
    EndDriveVerification(EndDriveVerificationTransaction),
    StartFileDownload(StartFileDownloadTransaction),
    EndFileDownload(EndFileDownloadTransaction),
    Aggregate(AggregateTransaction),
);
