//! Drive records and their JSON mapping.

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::debug;

use super::DriveError;
use crate::identity::{NetworkType, PublicAccount};
use crate::mapper::{map_ordered, MapperConfig};
use crate::transaction::dto::{parse_account, parse_hash};
use crate::transaction::{Amount, Duration, Hash, Height, StorageSize};

/// Lifecycle of a drive contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum DriveState {
    NotStarted = 0,
    Pending = 1,
    InProgress = 2,
    Finished = 3,
}

impl TryFrom<u8> for DriveState {
    type Error = DriveError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(DriveState::NotStarted),
            1 => Ok(DriveState::Pending),
            2 => Ok(DriveState::InProgress),
            3 => Ok(DriveState::Finished),
            other => Err(DriveError::UnknownState(other)),
        }
    }
}

impl From<DriveState> for u8 {
    fn from(state: DriveState) -> Self {
        state as u8
    }
}

impl fmt::Display for DriveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DriveState::NotStarted => "not started",
            DriveState::Pending => "pending",
            DriveState::InProgress => "in progress",
            DriveState::Finished => "finished",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentInformation {
    pub receiver: PublicAccount,
    pub amount: Amount,
    pub height: Height,
}

/// Payments made during one billing period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingDescription {
    pub start: Height,
    pub end: Height,
    pub payments: Vec<PaymentInformation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicatorInfo {
    pub account: PublicAccount,
    pub start: Height,
    pub end: Height,
    pub index: u32,
    pub active_files_without_deposit: BTreeSet<Hash>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drive {
    pub drive_account: PublicAccount,
    pub start: Height,
    pub state: DriveState,
    pub owner_account: PublicAccount,
    pub root_hash: Hash,
    pub duration: Duration,
    pub billing_period: Duration,
    pub billing_price: Amount,
    pub drive_size: StorageSize,
    pub occupied_space: StorageSize,
    pub replicas: u16,
    pub min_replicators: u16,
    pub percent_approvers: u8,
    pub billing_history: Vec<BillingDescription>,
    pub files: BTreeMap<Hash, StorageSize>,
    /// Keyed by the replicator's public key, upper-case hex.
    pub replicators: BTreeMap<String, ReplicatorInfo>,
    pub upload_payments: Vec<PaymentInformation>,
}

impl Drive {
    /// Bytes still free on the drive.
    pub fn free_space(&self) -> StorageSize {
        StorageSize(self.drive_size.0.saturating_sub(self.occupied_space.0))
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, DriveState::Pending | DriveState::InProgress)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total_entries: u64,
    pub page_number: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

/// One page of drives, in the order the node returned them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrivesPage {
    pub drives: Vec<Drive>,
    pub pagination: Pagination,
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentDto {
    receiver: String,
    amount: Amount,
    height: Height,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BillingDto {
    start: Height,
    end: Height,
    #[serde(default)]
    payments: Vec<PaymentDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileDto {
    file_hash: String,
    size: StorageSize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplicatorDto {
    replicator: String,
    start: Height,
    end: Height,
    #[serde(default)]
    index: u32,
    #[serde(default)]
    active_files_without_deposit: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveDto {
    multisig: String,
    start: Height,
    state: u8,
    owner: String,
    root_hash: String,
    duration: Duration,
    billing_period: Duration,
    billing_price: Amount,
    size: StorageSize,
    #[serde(default)]
    occupied_space: StorageSize,
    replicas: u16,
    min_replicators: u16,
    percent_approvers: u8,
    #[serde(default)]
    billing_history: Vec<BillingDto>,
    #[serde(default)]
    files: Vec<FileDto>,
    #[serde(default)]
    replicators: Vec<ReplicatorDto>,
    #[serde(default)]
    upload_payments: Vec<PaymentDto>,
}

#[derive(Debug, Deserialize)]
struct DriveEnvelope {
    drive: DriveDto,
}

#[derive(Debug, Deserialize)]
struct DrivesPageDto<'a> {
    #[serde(borrow)]
    data: Vec<&'a RawValue>,
    pagination: Pagination,
}

impl PaymentDto {
    fn into_model(self, network_type: NetworkType) -> Result<PaymentInformation, DriveError> {
        Ok(PaymentInformation {
            receiver: parse_account("receiver", &self.receiver, network_type)?,
            amount: self.amount,
            height: self.height,
        })
    }
}

fn map_payments(
    payments: Vec<PaymentDto>,
    network_type: NetworkType,
) -> Result<Vec<PaymentInformation>, DriveError> {
    payments
        .into_iter()
        .map(|p| p.into_model(network_type))
        .collect()
}

impl DriveDto {
    fn into_model(self, network_type: NetworkType) -> Result<Drive, DriveError> {
        let billing_history = self
            .billing_history
            .into_iter()
            .map(|b| {
                Ok(BillingDescription {
                    start: b.start,
                    end: b.end,
                    payments: map_payments(b.payments, network_type)?,
                })
            })
            .collect::<Result<Vec<_>, DriveError>>()?;

        let files = self
            .files
            .into_iter()
            .map(|f| Ok((parse_hash("files.fileHash", &f.file_hash)?, f.size)))
            .collect::<Result<BTreeMap<_, _>, DriveError>>()?;

        let replicators = self
            .replicators
            .into_iter()
            .map(|r| {
                let account = parse_account("replicators.replicator", &r.replicator, network_type)?;
                let active_files_without_deposit = r
                    .active_files_without_deposit
                    .iter()
                    .map(|h| parse_hash("replicators.activeFilesWithoutDeposit", h))
                    .collect::<Result<BTreeSet<_>, _>>()?;
                let info = ReplicatorInfo {
                    account,
                    start: r.start,
                    end: r.end,
                    index: r.index,
                    active_files_without_deposit,
                };
                Ok((info.account.public_key_hex(), info))
            })
            .collect::<Result<BTreeMap<_, _>, DriveError>>()?;

        Ok(Drive {
            drive_account: parse_account("multisig", &self.multisig, network_type)?,
            start: self.start,
            state: DriveState::try_from(self.state)?,
            owner_account: parse_account("owner", &self.owner, network_type)?,
            root_hash: parse_hash("rootHash", &self.root_hash)?,
            duration: self.duration,
            billing_period: self.billing_period,
            billing_price: self.billing_price,
            drive_size: self.size,
            occupied_space: self.occupied_space,
            replicas: self.replicas,
            min_replicators: self.min_replicators,
            percent_approvers: self.percent_approvers,
            billing_history,
            files,
            replicators,
            upload_payments: map_payments(self.upload_payments, network_type)?,
        })
    }
}

/// Maps one `{ "drive": {...} }` document.
pub fn map_drive(json: &[u8], network_type: NetworkType) -> Result<Drive, DriveError> {
    let envelope: DriveEnvelope = serde_json::from_slice(json)?;
    envelope.drive.into_model(network_type)
}

impl DrivesPage {
    /// Maps a `/drives` page, decoding entries on `config.workers` threads.
    ///
    /// Fails with the lowest-indexed bad entry; no partial page is returned.
    pub fn from_json(
        json: &[u8],
        network_type: NetworkType,
        config: &MapperConfig,
    ) -> Result<Self, DriveError> {
        let page: DrivesPageDto<'_> = serde_json::from_slice(json)?;
        debug!(
            entries = page.data.len(),
            page = page.pagination.page_number,
            "mapping drives page"
        );

        let drives = map_ordered(page.data, config, |raw| {
            map_drive(raw.get().as_bytes(), network_type)
        })?;

        Ok(Self {
            drives,
            pagination: page.pagination,
        })
    }
}
