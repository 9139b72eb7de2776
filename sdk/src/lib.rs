// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Sirius SDK Core
//!
//! The part of a Sirius chain client that has to be byte-exact: the binary
//! transaction codec that gets hashed and signed, and the identifiers that
//! are derived from keys and names. Get one byte wrong here and every node
//! on the network rejects the payload, or worse, the SDK talks about a
//! mosaic nobody owns.
//!
//! ## Modules
//!
//! - **uint64** — The `[low, high]` word pair every 64-bit value travels as.
//! - **crypto** — SHA3-256 and RIPEMD-160, composed into checksums.
//! - **identity** — Networks, addresses, public accounts.
//! - **asset** — Mosaic and namespace ids.
//! - **transaction** — The drive-lifecycle transactions, aggregates,
//!   dispatch and signing.
//! - **mapper** — Order-preserving, bounded-parallel page decoding.
//! - **storage** — Drives as the node reports them.
//! - **websocket** — Dispatch of "unconfirmed added" messages to callbacks.
//! - **config** — Wire-format constants.
//!
//! Transport is not here. HTTP, websocket connections and key storage are
//! the caller's business; the SDK consumes JSON and bytes and produces
//! JSON and bytes.

pub mod asset;
pub mod config;
pub mod crypto;
pub mod identity;
pub mod mapper;
pub mod storage;
pub mod transaction;
pub mod uint64;
pub mod websocket;

pub use asset::{MosaicId, NamespaceId};
pub use identity::{Address, IdentityError, NetworkType, PublicAccount};
pub use mapper::{map_ordered, MapperConfig, PageError};
pub use transaction::{Transaction, TransactionBody, TransactionError};
pub use uint64::Uint64Dto;
