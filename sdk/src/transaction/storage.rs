//! Drive-lifecycle transactions.
//!
//! A drive is a storage contract between an owner and a set of replicators.
//! Its life runs through these transactions:
//!
//! ```text
//! PrepareDrive -> JoinToDrive* -> (DriveFileSystem | FilesDeposit
//!     | StartDriveVerification -> EndDriveVerification
//!     | StartFileDownload -> EndFileDownload
//!     | DriveFilesReward)* -> EndDrive
//! ```

use serde::{Deserialize, Serialize};

use super::buffer::{wire_count, TransactionReader, TransactionWriter};
use super::dto::{self, TransactionHeaderDto};
use super::header::{AbstractTransaction, Deadline, TransactionInfo};
use super::types::{Amount, Duration, EntityType, Hash, StorageSize};
use super::{TransactionBody, TransactionError};
use crate::config::*;
use crate::identity::{NetworkType, PublicAccount};
use crate::uint64::Uint64Dto;

fn require(condition: bool, reason: &str) -> Result<(), TransactionError> {
    if condition {
        Ok(())
    } else {
        Err(TransactionError::validation(reason))
    }
}

fn check_count(field: &str, announced: u16, actual: usize) -> Result<(), TransactionError> {
    if usize::from(announced) != actual {
        return Err(TransactionError::malformed(
            field,
            format!("announces {announced} entries, found {actual}"),
        ));
    }
    Ok(())
}

fn read_account(
    r: &mut TransactionReader<'_>,
    network_type: NetworkType,
) -> Result<PublicAccount, TransactionError> {
    Ok(PublicAccount::from_public_key_bytes(r.get_key()?, network_type))
}

// ---------------------------------------------------------------------------
// Child records
// ---------------------------------------------------------------------------

/// A file referenced by content hash only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    pub file_hash: Hash,
}

/// A file added to a drive's file system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddAction {
    pub file_hash: Hash,
    pub file_size: StorageSize,
}

/// A file removed from a drive's file system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveAction {
    pub file_hash: Hash,
}

/// A file requested for download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadFile {
    pub file_hash: Hash,
    pub file_size: StorageSize,
}

impl File {
    fn write(&self, w: &mut TransactionWriter) {
        w.put_bytes(self.file_hash.as_bytes());
    }

    fn read(r: &mut TransactionReader<'_>) -> Result<Self, TransactionError> {
        Ok(Self {
            file_hash: Hash(r.get_hash()?),
        })
    }
}

impl RemoveAction {
    fn write(&self, w: &mut TransactionWriter) {
        w.put_bytes(self.file_hash.as_bytes());
    }

    fn read(r: &mut TransactionReader<'_>) -> Result<Self, TransactionError> {
        Ok(Self {
            file_hash: Hash(r.get_hash()?),
        })
    }
}

/// Hash followed by size: the layout of both add actions and downloads.
macro_rules! sized_file_codec {
    ($($ty:ident),*) => {
        $(
            impl $ty {
                fn write(&self, w: &mut TransactionWriter) {
                    w.put_bytes(self.file_hash.as_bytes());
                    w.put_u64(self.file_size.0);
                }

                fn read(r: &mut TransactionReader<'_>) -> Result<Self, TransactionError> {
                    Ok(Self {
                        file_hash: Hash(r.get_hash()?),
                        file_size: StorageSize(r.get_u64()?),
                    })
                }
            }
        )*
    };
}

sized_file_codec!(AddAction, DownloadFile);

/// Storage a participant uploaded, as rewarded by [`DriveFilesRewardTransaction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadInfo {
    pub participant: PublicAccount,
    pub uploaded_size: Amount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadInfoDto {
    pub participant: String,
    pub uploaded: Uint64Dto,
}

/// A replicator that failed verification, with the block hashes it could
/// not prove.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureVerification {
    pub replicator: PublicAccount,
    pub block_hashes: Vec<Hash>,
}

impl FailureVerification {
    /// Encoded size: size slot, replicator key and hashes.
    pub fn size(&self) -> usize {
        SIZE_SIZE + KEY_SIZE + HASH_SIZE * self.block_hashes.len()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureVerificationDto {
    pub replicator: String,
    #[serde(default)]
    pub block_hashes: Vec<Hash>,
}

// ---------------------------------------------------------------------------
// PrepareDrive
// ---------------------------------------------------------------------------

/// Opens a drive and fixes its billing terms.
#[derive(Debug, Clone, PartialEq)]
pub struct PrepareDriveTransaction {
    pub header: AbstractTransaction,
    pub owner: PublicAccount,
    pub duration: Duration,
    pub billing_period: Duration,
    pub billing_price: Amount,
    pub drive_size: StorageSize,
    pub replicas: u16,
    pub min_replicators: u16,
    pub percent_approvers: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareDriveDto {
    #[serde(flatten)]
    pub header: TransactionHeaderDto,
    pub owner: String,
    pub duration: Uint64Dto,
    pub billing_period: Uint64Dto,
    pub billing_price: Uint64Dto,
    pub drive_size: Uint64Dto,
    pub replicas: u16,
    pub min_replicators: u16,
    pub percent_approvers: u8,
}

impl PrepareDriveTransaction {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        deadline: Deadline,
        owner: PublicAccount,
        duration: Duration,
        billing_period: Duration,
        billing_price: Amount,
        drive_size: StorageSize,
        replicas: u16,
        min_replicators: u16,
        percent_approvers: u8,
        network_type: NetworkType,
    ) -> Result<Self, TransactionError> {
        require(duration.0 > 0, "duration must be > 0")?;
        require(billing_period.0 > 0, "billing period must be > 0")?;
        require(
            billing_period <= duration,
            "billing period must not exceed the drive duration",
        )?;
        require(drive_size.0 > 0, "drive size must be > 0")?;
        require(replicas > 0, "replicas must be > 0")?;
        require(min_replicators > 0, "min replicators must be > 0")?;
        require(
            min_replicators <= replicas,
            "min replicators must not exceed replicas",
        )?;
        require(percent_approvers <= 100, "percent approvers must be <= 100")?;

        Ok(Self {
            header: AbstractTransaction::new(
                EntityType::PrepareDrive,
                PREPARE_DRIVE_VERSION,
                network_type,
                deadline,
            ),
            owner,
            duration,
            billing_period,
            billing_price,
            drive_size,
            replicas,
            min_replicators,
            percent_approvers,
        })
    }
}

impl TransactionBody for PrepareDriveTransaction {
    const ENTITY_TYPES: &'static [EntityType] = &[EntityType::PrepareDrive];
    type Dto = PrepareDriveDto;

    fn header(&self) -> &AbstractTransaction {
        &self.header
    }

    fn header_mut(&mut self) -> &mut AbstractTransaction {
        &mut self.header
    }

    fn payload_size(&self) -> usize {
        PREPARE_DRIVE_HEADER_SIZE - TRANSACTION_HEADER_SIZE
    }

    fn write_payload(&self, w: &mut TransactionWriter) -> Result<(), TransactionError> {
        w.put_bytes(self.owner.public_key());
        w.put_u64(self.duration.0);
        w.put_u64(self.billing_period.0);
        w.put_u64(self.billing_price.0);
        w.put_u64(self.drive_size.0);
        w.put_u16(self.replicas);
        w.put_u16(self.min_replicators);
        w.put_u8(self.percent_approvers);
        Ok(())
    }

    fn read_payload(
        header: AbstractTransaction,
        r: &mut TransactionReader<'_>,
    ) -> Result<Self, TransactionError> {
        Ok(Self {
            owner: read_account(r, header.network_type)?,
            duration: Duration(r.get_u64()?),
            billing_period: Duration(r.get_u64()?),
            billing_price: Amount(r.get_u64()?),
            drive_size: StorageSize(r.get_u64()?),
            replicas: r.get_u16()?,
            min_replicators: r.get_u16()?,
            percent_approvers: r.get_u8()?,
            header,
        })
    }

    fn to_dto(&self) -> Result<Self::Dto, TransactionError> {
        Ok(PrepareDriveDto {
            header: self.header.to_dto(),
            owner: self.owner.public_key_hex(),
            duration: self.duration.into(),
            billing_period: self.billing_period.into(),
            billing_price: self.billing_price.into(),
            drive_size: self.drive_size.into(),
            replicas: self.replicas,
            min_replicators: self.min_replicators,
            percent_approvers: self.percent_approvers,
        })
    }

    fn from_dto(dto: Self::Dto, info: Option<TransactionInfo>) -> Result<Self, TransactionError> {
        let header = AbstractTransaction::from_dto(&dto.header, info)?;
        Ok(Self {
            owner: dto::parse_account("owner", &dto.owner, header.network_type)?,
            duration: dto.duration.into(),
            billing_period: dto.billing_period.into(),
            billing_price: dto.billing_price.into(),
            drive_size: dto.drive_size.into(),
            replicas: dto.replicas,
            min_replicators: dto.min_replicators,
            percent_approvers: dto.percent_approvers,
            header,
        })
    }
}

// ---------------------------------------------------------------------------
// Single drive key transactions
// ---------------------------------------------------------------------------

/// Declares a transaction whose payload is only the drive key.
macro_rules! drive_key_transaction {
    ($(#[$meta:meta])* $name:ident, $dto:ident, $entity:ident, $version:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            pub header: AbstractTransaction,
            pub drive: PublicAccount,
        }

        #[derive(Debug, Clone, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $dto {
            #[serde(flatten)]
            pub header: TransactionHeaderDto,
            pub drive_key: String,
        }

        impl $name {
            pub fn new(deadline: Deadline, drive: PublicAccount, network_type: NetworkType) -> Self {
                Self {
                    header: AbstractTransaction::new(
                        EntityType::$entity,
                        $version,
                        network_type,
                        deadline,
                    ),
                    drive,
                }
            }
        }

        impl TransactionBody for $name {
            const ENTITY_TYPES: &'static [EntityType] = &[EntityType::$entity];
            type Dto = $dto;

            fn header(&self) -> &AbstractTransaction {
                &self.header
            }

            fn header_mut(&mut self) -> &mut AbstractTransaction {
                &mut self.header
            }

            fn payload_size(&self) -> usize {
                KEY_SIZE
            }

            fn write_payload(&self, w: &mut TransactionWriter) -> Result<(), TransactionError> {
                w.put_bytes(self.drive.public_key());
                Ok(())
            }

            fn read_payload(
                header: AbstractTransaction,
                r: &mut TransactionReader<'_>,
            ) -> Result<Self, TransactionError> {
                Ok(Self {
                    drive: read_account(r, header.network_type)?,
                    header,
                })
            }

            fn to_dto(&self) -> Result<Self::Dto, TransactionError> {
                Ok($dto {
                    header: self.header.to_dto(),
                    drive_key: self.drive.public_key_hex(),
                })
            }

            fn from_dto(
                dto: Self::Dto,
                info: Option<TransactionInfo>,
            ) -> Result<Self, TransactionError> {
                let header = AbstractTransaction::from_dto(&dto.header, info)?;
                Ok(Self {
                    drive: dto::parse_account("driveKey", &dto.drive_key, header.network_type)?,
                    header,
                })
            }
        }
    };
}

drive_key_transaction!(
    /// A replicator joins a prepared drive.
    JoinToDriveTransaction,
    JoinToDriveDto,
    JoinToDrive,
    JOIN_TO_DRIVE_VERSION
);

drive_key_transaction!(
    /// Closes a drive and settles its remaining deposits.
    EndDriveTransaction,
    EndDriveDto,
    EndDrive,
    END_DRIVE_VERSION
);

drive_key_transaction!(
    /// Opens a verification round for a drive.
    StartDriveVerificationTransaction,
    StartDriveVerificationDto,
    StartDriveVerification,
    START_DRIVE_VERIFICATION_VERSION
);

// ---------------------------------------------------------------------------
// DriveFileSystem
// ---------------------------------------------------------------------------

/// Recovers the new root hash from the transmitted xor and the previous
/// root hash known from chain state.
pub fn recover_new_root_hash(xor_root_hash: Hash, old_root_hash: Hash) -> Hash {
    xor_root_hash ^ old_root_hash
}

/// Moves a drive's file system from one root hash to the next.
///
/// On the wire the new root hash travels next to `new ^ old`; decoding
/// recovers the old one from the pair.
#[derive(Debug, Clone, PartialEq)]
pub struct DriveFileSystemTransaction {
    pub header: AbstractTransaction,
    pub drive: PublicAccount,
    pub new_root_hash: Hash,
    pub old_root_hash: Hash,
    pub add_actions: Vec<AddAction>,
    pub remove_actions: Vec<RemoveAction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFileSystemDto {
    #[serde(flatten)]
    pub header: TransactionHeaderDto,
    pub drive_key: String,
    pub root_hash: String,
    pub xor_root_hash: String,
    pub add_actions_count: u16,
    pub remove_actions_count: u16,
    #[serde(default)]
    pub add_actions: Vec<AddAction>,
    #[serde(default)]
    pub remove_actions: Vec<RemoveAction>,
}

impl DriveFileSystemTransaction {
    pub fn new(
        deadline: Deadline,
        drive: PublicAccount,
        new_root_hash: Hash,
        old_root_hash: Hash,
        add_actions: Vec<AddAction>,
        remove_actions: Vec<RemoveAction>,
        network_type: NetworkType,
    ) -> Result<Self, TransactionError> {
        require(
            !add_actions.is_empty() || !remove_actions.is_empty() || new_root_hash != old_root_hash,
            "file system change has no actions and keeps the same root hash",
        )?;

        Ok(Self {
            header: AbstractTransaction::new(
                EntityType::DriveFileSystem,
                DRIVE_FILE_SYSTEM_VERSION,
                network_type,
                deadline,
            ),
            drive,
            new_root_hash,
            old_root_hash,
            add_actions,
            remove_actions,
        })
    }

    /// `new_root_hash ^ old_root_hash`, the value written on the wire.
    pub fn xor_root_hash(&self) -> Hash {
        self.new_root_hash ^ self.old_root_hash
    }
}

impl TransactionBody for DriveFileSystemTransaction {
    const ENTITY_TYPES: &'static [EntityType] = &[EntityType::DriveFileSystem];
    type Dto = DriveFileSystemDto;

    fn header(&self) -> &AbstractTransaction {
        &self.header
    }

    fn header_mut(&mut self) -> &mut AbstractTransaction {
        &mut self.header
    }

    fn payload_size(&self) -> usize {
        DRIVE_FILE_SYSTEM_HEADER_SIZE - TRANSACTION_HEADER_SIZE
            + ADD_ACTION_SIZE * self.add_actions.len()
            + REMOVE_ACTION_SIZE * self.remove_actions.len()
    }

    fn write_payload(&self, w: &mut TransactionWriter) -> Result<(), TransactionError> {
        w.put_bytes(self.drive.public_key());
        w.put_bytes(self.new_root_hash.as_bytes());
        w.put_bytes(self.xor_root_hash().as_bytes());
        w.put_count("addActions", self.add_actions.len())?;
        w.put_count("removeActions", self.remove_actions.len())?;
        for action in &self.add_actions {
            action.write(w);
        }
        for action in &self.remove_actions {
            action.write(w);
        }
        Ok(())
    }

    fn read_payload(
        header: AbstractTransaction,
        r: &mut TransactionReader<'_>,
    ) -> Result<Self, TransactionError> {
        let drive = read_account(r, header.network_type)?;
        let new_root_hash = Hash(r.get_hash()?);
        let xor_root_hash = Hash(r.get_hash()?);
        let add_count = r.get_u16()?;
        let remove_count = r.get_u16()?;
        let add_actions = (0..add_count)
            .map(|_| AddAction::read(r))
            .collect::<Result<Vec<_>, _>>()?;
        let remove_actions = (0..remove_count)
            .map(|_| RemoveAction::read(r))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            header,
            drive,
            new_root_hash,
            old_root_hash: xor_root_hash ^ new_root_hash,
            add_actions,
            remove_actions,
        })
    }

    fn to_dto(&self) -> Result<Self::Dto, TransactionError> {
        Ok(DriveFileSystemDto {
            header: self.header.to_dto(),
            drive_key: self.drive.public_key_hex(),
            root_hash: self.new_root_hash.to_hex(),
            xor_root_hash: self.xor_root_hash().to_hex(),
            add_actions_count: wire_count("addActions", self.add_actions.len())?,
            remove_actions_count: wire_count("removeActions", self.remove_actions.len())?,
            add_actions: self.add_actions.clone(),
            remove_actions: self.remove_actions.clone(),
        })
    }

    fn from_dto(dto: Self::Dto, info: Option<TransactionInfo>) -> Result<Self, TransactionError> {
        let header = AbstractTransaction::from_dto(&dto.header, info)?;
        check_count("addActionsCount", dto.add_actions_count, dto.add_actions.len())?;
        check_count(
            "removeActionsCount",
            dto.remove_actions_count,
            dto.remove_actions.len(),
        )?;
        let new_root_hash = dto::parse_hash("rootHash", &dto.root_hash)?;
        let xor_root_hash = dto::parse_hash("xorRootHash", &dto.xor_root_hash)?;

        Ok(Self {
            drive: dto::parse_account("driveKey", &dto.drive_key, header.network_type)?,
            new_root_hash,
            old_root_hash: xor_root_hash ^ new_root_hash,
            add_actions: dto.add_actions,
            remove_actions: dto.remove_actions,
            header,
        })
    }
}

// ---------------------------------------------------------------------------
// FilesDeposit
// ---------------------------------------------------------------------------

/// Deposits for files a replicator must keep on a drive.
#[derive(Debug, Clone, PartialEq)]
pub struct FilesDepositTransaction {
    pub header: AbstractTransaction,
    pub drive: PublicAccount,
    pub files: Vec<File>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesDepositDto {
    #[serde(flatten)]
    pub header: TransactionHeaderDto,
    pub drive_key: String,
    pub files_count: u16,
    #[serde(default)]
    pub files: Vec<File>,
}

impl FilesDepositTransaction {
    pub fn new(
        deadline: Deadline,
        drive: PublicAccount,
        files: Vec<File>,
        network_type: NetworkType,
    ) -> Result<Self, TransactionError> {
        require(!files.is_empty(), "files deposit needs at least one file")?;
        Ok(Self {
            header: AbstractTransaction::new(
                EntityType::FilesDeposit,
                FILES_DEPOSIT_VERSION,
                network_type,
                deadline,
            ),
            drive,
            files,
        })
    }
}

impl TransactionBody for FilesDepositTransaction {
    const ENTITY_TYPES: &'static [EntityType] = &[EntityType::FilesDeposit];
    type Dto = FilesDepositDto;

    fn header(&self) -> &AbstractTransaction {
        &self.header
    }

    fn header_mut(&mut self) -> &mut AbstractTransaction {
        &mut self.header
    }

    fn payload_size(&self) -> usize {
        FILES_DEPOSIT_HEADER_SIZE - TRANSACTION_HEADER_SIZE + FILE_SIZE * self.files.len()
    }

    fn write_payload(&self, w: &mut TransactionWriter) -> Result<(), TransactionError> {
        w.put_bytes(self.drive.public_key());
        w.put_count("files", self.files.len())?;
        for file in &self.files {
            file.write(w);
        }
        Ok(())
    }

    fn read_payload(
        header: AbstractTransaction,
        r: &mut TransactionReader<'_>,
    ) -> Result<Self, TransactionError> {
        let drive = read_account(r, header.network_type)?;
        let count = r.get_u16()?;
        let files = (0..count)
            .map(|_| File::read(r))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            header,
            drive,
            files,
        })
    }

    fn to_dto(&self) -> Result<Self::Dto, TransactionError> {
        Ok(FilesDepositDto {
            header: self.header.to_dto(),
            drive_key: self.drive.public_key_hex(),
            files_count: wire_count("files", self.files.len())?,
            files: self.files.clone(),
        })
    }

    fn from_dto(dto: Self::Dto, info: Option<TransactionInfo>) -> Result<Self, TransactionError> {
        let header = AbstractTransaction::from_dto(&dto.header, info)?;
        check_count("filesCount", dto.files_count, dto.files.len())?;
        Ok(Self {
            drive: dto::parse_account("driveKey", &dto.drive_key, header.network_type)?,
            files: dto.files,
            header,
        })
    }
}

// ---------------------------------------------------------------------------
// DriveFilesReward
// ---------------------------------------------------------------------------

/// Pays participants for the data they uploaded to a drive.
#[derive(Debug, Clone, PartialEq)]
pub struct DriveFilesRewardTransaction {
    pub header: AbstractTransaction,
    pub upload_infos: Vec<UploadInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFilesRewardDto {
    #[serde(flatten)]
    pub header: TransactionHeaderDto,
    pub upload_infos_count: u16,
    #[serde(default)]
    pub upload_infos: Vec<UploadInfoDto>,
}

impl DriveFilesRewardTransaction {
    pub fn new(
        deadline: Deadline,
        upload_infos: Vec<UploadInfo>,
        network_type: NetworkType,
    ) -> Result<Self, TransactionError> {
        require(!upload_infos.is_empty(), "files reward needs at least one upload info")?;
        Ok(Self {
            header: AbstractTransaction::new(
                EntityType::DriveFilesReward,
                DRIVE_FILES_REWARD_VERSION,
                network_type,
                deadline,
            ),
            upload_infos,
        })
    }
}

impl TransactionBody for DriveFilesRewardTransaction {
    const ENTITY_TYPES: &'static [EntityType] = &[EntityType::DriveFilesReward];
    type Dto = DriveFilesRewardDto;

    fn header(&self) -> &AbstractTransaction {
        &self.header
    }

    fn header_mut(&mut self) -> &mut AbstractTransaction {
        &mut self.header
    }

    fn payload_size(&self) -> usize {
        DRIVE_FILES_REWARD_HEADER_SIZE - TRANSACTION_HEADER_SIZE
            + UPLOAD_INFO_SIZE * self.upload_infos.len()
    }

    fn write_payload(&self, w: &mut TransactionWriter) -> Result<(), TransactionError> {
        w.put_count("uploadInfos", self.upload_infos.len())?;
        for info in &self.upload_infos {
            w.put_bytes(info.participant.public_key());
            w.put_u64(info.uploaded_size.0);
        }
        Ok(())
    }

    fn read_payload(
        header: AbstractTransaction,
        r: &mut TransactionReader<'_>,
    ) -> Result<Self, TransactionError> {
        let count = r.get_u16()?;
        let upload_infos = (0..count)
            .map(|_| {
                Ok(UploadInfo {
                    participant: read_account(r, header.network_type)?,
                    uploaded_size: Amount(r.get_u64()?),
                })
            })
            .collect::<Result<Vec<_>, TransactionError>>()?;
        Ok(Self {
            header,
            upload_infos,
        })
    }

    fn to_dto(&self) -> Result<Self::Dto, TransactionError> {
        Ok(DriveFilesRewardDto {
            header: self.header.to_dto(),
            upload_infos_count: wire_count("uploadInfos", self.upload_infos.len())?,
            upload_infos: self
                .upload_infos
                .iter()
                .map(|info| UploadInfoDto {
                    participant: info.participant.public_key_hex(),
                    uploaded: info.uploaded_size.into(),
                })
                .collect(),
        })
    }

    fn from_dto(dto: Self::Dto, info: Option<TransactionInfo>) -> Result<Self, TransactionError> {
        let header = AbstractTransaction::from_dto(&dto.header, info)?;
        check_count("uploadInfosCount", dto.upload_infos_count, dto.upload_infos.len())?;
        let upload_infos = dto
            .upload_infos
            .iter()
            .map(|info| {
                Ok(UploadInfo {
                    participant: dto::parse_account(
                        "uploadInfos.participant",
                        &info.participant,
                        header.network_type,
                    )?,
                    uploaded_size: info.uploaded.into(),
                })
            })
            .collect::<Result<Vec<_>, TransactionError>>()?;
        Ok(Self {
            header,
            upload_infos,
        })
    }
}

// ---------------------------------------------------------------------------
// EndDriveVerification
// ---------------------------------------------------------------------------

/// Closes a verification round, listing the replicators that failed.
///
/// There is no count field: the failures fill the rest of the transaction,
/// each prefixed by its own size.
#[derive(Debug, Clone, PartialEq)]
pub struct EndDriveVerificationTransaction {
    pub header: AbstractTransaction,
    pub failures: Vec<FailureVerification>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndDriveVerificationDto {
    #[serde(flatten)]
    pub header: TransactionHeaderDto,
    #[serde(default)]
    pub verification_failures: Vec<FailureVerificationDto>,
}

impl EndDriveVerificationTransaction {
    pub fn new(
        deadline: Deadline,
        failures: Vec<FailureVerification>,
        network_type: NetworkType,
    ) -> Self {
        Self {
            header: AbstractTransaction::new(
                EntityType::EndDriveVerification,
                END_DRIVE_VERIFICATION_VERSION,
                network_type,
                deadline,
            ),
            failures,
        }
    }
}

impl TransactionBody for EndDriveVerificationTransaction {
    const ENTITY_TYPES: &'static [EntityType] = &[EntityType::EndDriveVerification];
    type Dto = EndDriveVerificationDto;

    fn header(&self) -> &AbstractTransaction {
        &self.header
    }

    fn header_mut(&mut self) -> &mut AbstractTransaction {
        &mut self.header
    }

    fn payload_size(&self) -> usize {
        END_DRIVE_VERIFICATION_HEADER_SIZE - TRANSACTION_HEADER_SIZE
            + self.failures.iter().map(FailureVerification::size).sum::<usize>()
    }

    fn write_payload(&self, w: &mut TransactionWriter) -> Result<(), TransactionError> {
        for failure in &self.failures {
            let size = u32::try_from(failure.size())
                .map_err(|_| TransactionError::validation("verification failure too large"))?;
            w.put_u32(size);
            w.put_bytes(failure.replicator.public_key());
            for hash in &failure.block_hashes {
                w.put_bytes(hash.as_bytes());
            }
        }
        Ok(())
    }

    fn read_payload(
        header: AbstractTransaction,
        r: &mut TransactionReader<'_>,
    ) -> Result<Self, TransactionError> {
        let fixed = SIZE_SIZE + KEY_SIZE;
        let mut failures = Vec::new();
        while r.remaining() > 0 {
            let size = r.get_u32()? as usize;
            if size < fixed || (size - fixed) % HASH_SIZE != 0 {
                return Err(TransactionError::malformed(
                    "verificationFailures",
                    format!("failure size {size} is not {fixed} + 32 * n"),
                ));
            }
            let replicator = read_account(r, header.network_type)?;
            let block_hashes = (0..(size - fixed) / HASH_SIZE)
                .map(|_| r.get_hash().map(Hash))
                .collect::<Result<Vec<_>, _>>()?;
            failures.push(FailureVerification {
                replicator,
                block_hashes,
            });
        }
        Ok(Self { header, failures })
    }

    fn to_dto(&self) -> Result<Self::Dto, TransactionError> {
        Ok(EndDriveVerificationDto {
            header: self.header.to_dto(),
            verification_failures: self
                .failures
                .iter()
                .map(|f| FailureVerificationDto {
                    replicator: f.replicator.public_key_hex(),
                    block_hashes: f.block_hashes.clone(),
                })
                .collect(),
        })
    }

    fn from_dto(dto: Self::Dto, info: Option<TransactionInfo>) -> Result<Self, TransactionError> {
        let header = AbstractTransaction::from_dto(&dto.header, info)?;
        let failures = dto
            .verification_failures
            .into_iter()
            .map(|f| {
                Ok(FailureVerification {
                    replicator: dto::parse_account(
                        "verificationFailures.replicator",
                        &f.replicator,
                        header.network_type,
                    )?,
                    block_hashes: f.block_hashes,
                })
            })
            .collect::<Result<Vec<_>, TransactionError>>()?;
        Ok(Self { header, failures })
    }
}

// ---------------------------------------------------------------------------
// StartFileDownload
// ---------------------------------------------------------------------------

/// Requests files from a drive's replicators.
#[derive(Debug, Clone, PartialEq)]
pub struct StartFileDownloadTransaction {
    pub header: AbstractTransaction,
    pub drive: PublicAccount,
    pub files: Vec<DownloadFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartFileDownloadDto {
    #[serde(flatten)]
    pub header: TransactionHeaderDto,
    pub drive_key: String,
    pub file_count: u16,
    #[serde(default)]
    pub files: Vec<DownloadFile>,
}

impl StartFileDownloadTransaction {
    pub fn new(
        deadline: Deadline,
        drive: PublicAccount,
        files: Vec<DownloadFile>,
        network_type: NetworkType,
    ) -> Result<Self, TransactionError> {
        require(!files.is_empty(), "download needs at least one file")?;
        Ok(Self {
            header: AbstractTransaction::new(
                EntityType::StartFileDownload,
                START_FILE_DOWNLOAD_VERSION,
                network_type,
                deadline,
            ),
            drive,
            files,
        })
    }
}

impl TransactionBody for StartFileDownloadTransaction {
    const ENTITY_TYPES: &'static [EntityType] = &[EntityType::StartFileDownload];
    type Dto = StartFileDownloadDto;

    fn header(&self) -> &AbstractTransaction {
        &self.header
    }

    fn header_mut(&mut self) -> &mut AbstractTransaction {
        &mut self.header
    }

    fn payload_size(&self) -> usize {
        START_FILE_DOWNLOAD_HEADER_SIZE - TRANSACTION_HEADER_SIZE
            + DOWNLOAD_FILE_SIZE * self.files.len()
    }

    fn write_payload(&self, w: &mut TransactionWriter) -> Result<(), TransactionError> {
        w.put_bytes(self.drive.public_key());
        w.put_count("files", self.files.len())?;
        for file in &self.files {
            file.write(w);
        }
        Ok(())
    }

    fn read_payload(
        header: AbstractTransaction,
        r: &mut TransactionReader<'_>,
    ) -> Result<Self, TransactionError> {
        let drive = read_account(r, header.network_type)?;
        let count = r.get_u16()?;
        let files = (0..count)
            .map(|_| DownloadFile::read(r))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            header,
            drive,
            files,
        })
    }

    fn to_dto(&self) -> Result<Self::Dto, TransactionError> {
        Ok(StartFileDownloadDto {
            header: self.header.to_dto(),
            drive_key: self.drive.public_key_hex(),
            file_count: wire_count("files", self.files.len())?,
            files: self.files.clone(),
        })
    }

    fn from_dto(dto: Self::Dto, info: Option<TransactionInfo>) -> Result<Self, TransactionError> {
        let header = AbstractTransaction::from_dto(&dto.header, info)?;
        check_count("fileCount", dto.file_count, dto.files.len())?;
        Ok(Self {
            drive: dto::parse_account("driveKey", &dto.drive_key, header.network_type)?,
            files: dto.files,
            header,
        })
    }
}

// ---------------------------------------------------------------------------
// EndFileDownload
// ---------------------------------------------------------------------------

/// Confirms a download identified by its operation token.
#[derive(Debug, Clone, PartialEq)]
pub struct EndFileDownloadTransaction {
    pub header: AbstractTransaction,
    pub recipient: PublicAccount,
    pub operation_token: Hash,
    pub files: Vec<DownloadFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndFileDownloadDto {
    #[serde(flatten)]
    pub header: TransactionHeaderDto,
    pub file_recipient: String,
    pub operation_token: String,
    pub file_count: u16,
    #[serde(default)]
    pub files: Vec<DownloadFile>,
}

impl EndFileDownloadTransaction {
    pub fn new(
        deadline: Deadline,
        recipient: PublicAccount,
        operation_token: Hash,
        files: Vec<DownloadFile>,
        network_type: NetworkType,
    ) -> Result<Self, TransactionError> {
        require(!files.is_empty(), "download needs at least one file")?;
        require(!operation_token.is_zero(), "operation token must be set")?;
        Ok(Self {
            header: AbstractTransaction::new(
                EntityType::EndFileDownload,
                END_FILE_DOWNLOAD_VERSION,
                network_type,
                deadline,
            ),
            recipient,
            operation_token,
            files,
        })
    }
}

impl TransactionBody for EndFileDownloadTransaction {
    const ENTITY_TYPES: &'static [EntityType] = &[EntityType::EndFileDownload];
    type Dto = EndFileDownloadDto;

    fn header(&self) -> &AbstractTransaction {
        &self.header
    }

    fn header_mut(&mut self) -> &mut AbstractTransaction {
        &mut self.header
    }

    fn payload_size(&self) -> usize {
        END_FILE_DOWNLOAD_HEADER_SIZE - TRANSACTION_HEADER_SIZE
            + DOWNLOAD_FILE_SIZE * self.files.len()
    }

    fn write_payload(&self, w: &mut TransactionWriter) -> Result<(), TransactionError> {
        w.put_bytes(self.recipient.public_key());
        w.put_bytes(self.operation_token.as_bytes());
        w.put_count("files", self.files.len())?;
        for file in &self.files {
            file.write(w);
        }
        Ok(())
    }

    fn read_payload(
        header: AbstractTransaction,
        r: &mut TransactionReader<'_>,
    ) -> Result<Self, TransactionError> {
        let recipient = read_account(r, header.network_type)?;
        let operation_token = Hash(r.get_hash()?);
        let count = r.get_u16()?;
        let files = (0..count)
            .map(|_| DownloadFile::read(r))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            header,
            recipient,
            operation_token,
            files,
        })
    }

    fn to_dto(&self) -> Result<Self::Dto, TransactionError> {
        Ok(EndFileDownloadDto {
            header: self.header.to_dto(),
            file_recipient: self.recipient.public_key_hex(),
            operation_token: self.operation_token.to_hex(),
            file_count: wire_count("files", self.files.len())?,
            files: self.files.clone(),
        })
    }

    fn from_dto(dto: Self::Dto, info: Option<TransactionInfo>) -> Result<Self, TransactionError> {
        let header = AbstractTransaction::from_dto(&dto.header, info)?;
        check_count("fileCount", dto.file_count, dto.files.len())?;
        Ok(Self {
            recipient: dto::parse_account("fileRecipient", &dto.file_recipient, header.network_type)?,
            operation_token: dto::parse_hash("operationToken", &dto.operation_token)?,
            files: dto.files,
            header,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const DRIVE_KEY: &str = "321DE652C4D3362FC2DDF7800F6582F4A10CFEA134B81F8AB6E4BE78BBA4D18E";
    const NETWORK: NetworkType = NetworkType::MijinTest;

    fn drive() -> PublicAccount {
        PublicAccount::from_public_key(DRIVE_KEY, NETWORK).unwrap()
    }

    fn deadline() -> Deadline {
        Deadline::from_millis(1)
    }

    fn hash(byte: u8) -> Hash {
        Hash([byte; 32])
    }

    fn assert_round_trip<T: TransactionBody + PartialEq + std::fmt::Debug>(tx: &T, size: usize) {
        let bytes = tx.to_bytes().unwrap();
        assert_eq!(bytes.len(), size);
        assert_eq!(tx.size(), size);
        assert_eq!(u32::from_le_bytes(bytes[0..4].try_into().unwrap()) as usize, size);
        assert_eq!(&T::from_bytes(&bytes).unwrap(), tx);
        let json = tx.to_json().unwrap();
        assert_eq!(&T::from_json(json).unwrap(), tx);
    }

    #[test]
    fn join_to_drive_golden_bytes() {
        let tx = JoinToDriveTransaction::new(deadline(), drive(), NETWORK);
        let bytes = tx.to_bytes().unwrap();

        let mut expected = Vec::new();
        expected.extend_from_slice(&154u32.to_le_bytes());
        expected.extend_from_slice(&[0u8; 64]);
        expected.extend_from_slice(&[0u8; 32]);
        expected.extend_from_slice(&[0x01, 0x00, 0x00, 0x90]);
        expected.extend_from_slice(&[0x5A, 0x42]);
        expected.extend_from_slice(&[0u8; 8]);
        expected.extend_from_slice(&[1, 0, 0, 0, 0, 0, 0, 0]);
        expected.extend_from_slice(&hex::decode(DRIVE_KEY).unwrap());

        assert_eq!(bytes, expected);
    }

    #[test]
    fn prepare_drive_round_trip() {
        let tx = PrepareDriveTransaction::new(
            deadline(),
            drive(),
            Duration(100),
            Duration(10),
            Amount(5),
            StorageSize(1 << 40),
            3,
            2,
            66,
            NETWORK,
        )
        .unwrap();
        assert_round_trip(&tx, 191);
    }

    #[test]
    fn prepare_drive_validation() {
        let build = |duration, size, replicas, min, percent| {
            PrepareDriveTransaction::new(
                deadline(),
                drive(),
                Duration(duration),
                Duration(1),
                Amount(1),
                StorageSize(size),
                replicas,
                min,
                percent,
                NETWORK,
            )
        };
        assert!(build(0, 1, 1, 1, 50).is_err());
        assert!(build(10, 0, 1, 1, 50).is_err());
        assert!(build(10, 1, 0, 0, 50).is_err());
        assert!(build(10, 1, 1, 2, 50).is_err());
        assert!(matches!(
            build(10, 1, 1, 1, 101),
            Err(TransactionError::Validation { .. })
        ));
        assert!(build(10, 1, 1, 1, 100).is_ok());
    }

    #[test]
    fn single_key_variants_are_154_bytes() {
        assert_round_trip(&JoinToDriveTransaction::new(deadline(), drive(), NETWORK), 154);
        assert_round_trip(&EndDriveTransaction::new(deadline(), drive(), NETWORK), 154);
        assert_round_trip(
            &StartDriveVerificationTransaction::new(deadline(), drive(), NETWORK),
            154,
        );
    }

    #[test]
    fn drive_file_system_size_and_xor() {
        let tx = DriveFileSystemTransaction::new(
            deadline(),
            drive(),
            hash(0x0F),
            hash(0xF1),
            vec![
                AddAction {
                    file_hash: hash(1),
                    file_size: StorageSize(10),
                },
                AddAction {
                    file_hash: hash(2),
                    file_size: StorageSize(20),
                },
            ],
            vec![RemoveAction { file_hash: hash(3) }],
            NETWORK,
        )
        .unwrap();

        assert_eq!(tx.xor_root_hash(), hash(0xFE));
        assert_round_trip(&tx, 222 + 2 * 40 + 32);

        let bytes = tx.to_bytes().unwrap();
        // drive key at 122, new root at 154, xor at 186.
        assert_eq!(&bytes[154..186], hash(0x0F).as_bytes());
        assert_eq!(&bytes[186..218], hash(0xFE).as_bytes());

        let decoded = DriveFileSystemTransaction::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.new_root_hash, tx.new_root_hash);
        assert_eq!(
            recover_new_root_hash(decoded.xor_root_hash(), tx.old_root_hash),
            tx.new_root_hash
        );
    }

    #[test]
    fn drive_file_system_rejects_empty_change() {
        assert!(DriveFileSystemTransaction::new(
            deadline(),
            drive(),
            hash(1),
            hash(1),
            vec![],
            vec![],
            NETWORK
        )
        .is_err());
    }

    #[test]
    fn files_deposit_sizes() {
        let files = vec![File { file_hash: hash(1) }, File { file_hash: hash(2) }];
        let tx = FilesDepositTransaction::new(deadline(), drive(), files, NETWORK).unwrap();
        assert_round_trip(&tx, 156 + 2 * 32);
        assert!(FilesDepositTransaction::new(deadline(), drive(), vec![], NETWORK).is_err());
    }

    #[test]
    fn drive_files_reward_sizes() {
        let infos = vec![UploadInfo {
            participant: drive(),
            uploaded_size: Amount(1_000),
        }];
        let tx = DriveFilesRewardTransaction::new(deadline(), infos, NETWORK).unwrap();
        assert_round_trip(&tx, 124 + 40);
    }

    #[test]
    fn end_drive_verification_fills_remainder() {
        let tx = EndDriveVerificationTransaction::new(
            deadline(),
            vec![
                FailureVerification {
                    replicator: drive(),
                    block_hashes: vec![hash(1), hash(2)],
                },
                FailureVerification {
                    replicator: drive(),
                    block_hashes: vec![],
                },
            ],
            NETWORK,
        );
        assert_round_trip(&tx, 122 + (36 + 64) + 36);
    }

    #[test]
    fn end_drive_verification_rejects_bad_failure_size() {
        let tx = EndDriveVerificationTransaction::new(
            deadline(),
            vec![FailureVerification {
                replicator: drive(),
                block_hashes: vec![hash(1)],
            }],
            NETWORK,
        );
        let mut bytes = tx.to_bytes().unwrap();
        bytes[122..126].copy_from_slice(&(37u32).to_le_bytes());
        assert!(matches!(
            EndDriveVerificationTransaction::from_bytes(&bytes),
            Err(TransactionError::MalformedField { .. })
        ));
    }

    #[test]
    fn file_download_sizes() {
        let files = vec![DownloadFile {
            file_hash: hash(9),
            file_size: StorageSize(512),
        }];
        let start =
            StartFileDownloadTransaction::new(deadline(), drive(), files.clone(), NETWORK).unwrap();
        assert_round_trip(&start, 156 + 40);

        let end =
            EndFileDownloadTransaction::new(deadline(), drive(), hash(7), files, NETWORK).unwrap();
        assert_round_trip(&end, 188 + 40);
    }

    #[test]
    fn file_download_requires_files() {
        assert!(StartFileDownloadTransaction::new(deadline(), drive(), vec![], NETWORK).is_err());
    }

    #[test]
    fn wrong_type_rejected_by_typed_decode() {
        let bytes = EndDriveTransaction::new(deadline(), drive(), NETWORK)
            .to_bytes()
            .unwrap();
        assert!(matches!(
            JoinToDriveTransaction::from_bytes(&bytes),
            Err(TransactionError::EntityTypeMismatch { .. })
        ));
    }

    #[test]
    fn count_mismatch_in_dto_rejected() {
        let tx = FilesDepositTransaction::new(
            deadline(),
            drive(),
            vec![File { file_hash: hash(1) }],
            NETWORK,
        )
        .unwrap();
        let mut json = tx.to_json().unwrap();
        json["transaction"]["filesCount"] = serde_json::json!(2);
        assert!(matches!(
            FilesDepositTransaction::from_json(json),
            Err(TransactionError::MalformedField { ref field, .. }) if field == "filesCount"
        ));
    }

    #[test]
    fn malformed_drive_key_in_dto() {
        let tx = JoinToDriveTransaction::new(deadline(), drive(), NETWORK);
        let mut json = tx.to_json().unwrap();
        json["transaction"]["driveKey"] = serde_json::json!("not hex");
        assert!(matches!(
            JoinToDriveTransaction::from_json(json),
            Err(TransactionError::MalformedField { ref field, .. }) if field == "driveKey"
        ));
    }

    #[test]
    fn truncated_payload_rejected() {
        let bytes = JoinToDriveTransaction::new(deadline(), drive(), NETWORK)
            .to_bytes()
            .unwrap();
        assert!(matches!(
            JoinToDriveTransaction::from_bytes(&bytes[..150]),
            Err(TransactionError::SizeMismatch { expected: 154, actual: 150 })
        ));
    }

    const TOO_MANY: usize = u16::MAX as usize + 1;

    fn assert_count_overflow<T: TransactionBody>(tx: &T, field: &str) {
        for result in [tx.to_bytes().map(drop), tx.to_json().map(drop)] {
            match result {
                Err(TransactionError::Validation { reason }) => {
                    assert!(reason.starts_with(field), "unexpected reason: {reason}")
                }
                other => panic!("expected a count overflow on {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn file_system_count_overflow_fails_both_forms() {
        let adds = vec![
            AddAction {
                file_hash: hash(1),
                file_size: StorageSize(1),
            };
            TOO_MANY
        ];
        let tx = DriveFileSystemTransaction::new(
            deadline(),
            drive(),
            hash(2),
            hash(3),
            adds,
            Vec::new(),
            NETWORK,
        )
        .unwrap();
        assert_count_overflow(&tx, "addActions");

        let removes = vec![RemoveAction { file_hash: hash(1) }; TOO_MANY];
        let tx = DriveFileSystemTransaction::new(
            deadline(),
            drive(),
            hash(2),
            hash(3),
            Vec::new(),
            removes,
            NETWORK,
        )
        .unwrap();
        assert_count_overflow(&tx, "removeActions");
    }

    #[test]
    fn files_deposit_count_overflow_fails_both_forms() {
        let files = vec![File { file_hash: hash(4) }; TOO_MANY];
        let tx = FilesDepositTransaction::new(deadline(), drive(), files, NETWORK).unwrap();
        assert_count_overflow(&tx, "files");
    }

    #[test]
    fn files_reward_count_overflow_fails_both_forms() {
        let infos = vec![
            UploadInfo {
                participant: drive(),
                uploaded_size: Amount(1),
            };
            TOO_MANY
        ];
        let tx = DriveFilesRewardTransaction::new(deadline(), infos, NETWORK).unwrap();
        assert_count_overflow(&tx, "uploadInfos");
    }

    #[test]
    fn download_count_overflow_fails_both_forms() {
        let files = vec![
            DownloadFile {
                file_hash: hash(5),
                file_size: StorageSize(1),
            };
            TOO_MANY
        ];

        let start =
            StartFileDownloadTransaction::new(deadline(), drive(), files.clone(), NETWORK).unwrap();
        assert_count_overflow(&start, "files");

        let end =
            EndFileDownloadTransaction::new(deadline(), drive(), hash(6), files, NETWORK).unwrap();
        assert_count_overflow(&end, "files");
    }

    #[test]
    fn largest_count_still_round_trips_through_json() {
        let files = vec![File { file_hash: hash(7) }; u16::MAX as usize];
        let tx = FilesDepositTransaction::new(deadline(), drive(), files, NETWORK).unwrap();
        let json = tx.to_json().unwrap();
        assert_eq!(json["transaction"]["filesCount"], u16::MAX);
        assert_eq!(FilesDepositTransaction::from_json(json).unwrap(), tx);
    }
}
