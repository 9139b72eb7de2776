//! # Storage Drives
//!
//! Read-side model of storage drives as the node reports them, and the
//! page decoder that maps a `/drives` response on the page mapper.

pub mod drive;

pub use drive::{
    map_drive, BillingDescription, Drive, DriveState, DrivesPage, Pagination, PaymentInformation,
    ReplicatorInfo,
};

use rayon::ThreadPoolBuildError;
use thiserror::Error;

use crate::mapper::PageError;
use crate::transaction::TransactionError;

#[derive(Debug, Error)]
pub enum DriveError {
    /// A key, hash or id inside the drive failed to parse.
    #[error(transparent)]
    Field(#[from] TransactionError),

    #[error("unknown drive state {0}")]
    UnknownState(u8),

    #[error("drive json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("drive {index}: {source}")]
    Entry {
        index: usize,
        #[source]
        source: Box<DriveError>,
    },

    #[error("could not start page workers: {0}")]
    Workers(#[from] ThreadPoolBuildError),
}

impl From<PageError<DriveError>> for DriveError {
    fn from(err: PageError<DriveError>) -> Self {
        match err {
            PageError::Entry { index, source } => DriveError::Entry {
                index,
                source: Box::new(source),
            },
            PageError::Pool(e) => DriveError::Workers(e),
        }
    }
}
