//! # Protocol Configuration & Constants
//!
//! Every magic number of the wire format lives here. The catapult layout is
//! shared with the node and every other SDK, so none of these values are
//! ours to change: a single byte off and the node rejects the payload.

// ---------------------------------------------------------------------------
// Key & Hash Sizes
// ---------------------------------------------------------------------------

/// Public key length in bytes.
pub const KEY_SIZE: usize = 32;

/// Hash length in bytes (SHA3-256 digests, file hashes, root hashes).
pub const HASH_SIZE: usize = 32;

/// Ed25519 signature length in bytes.
pub const SIGNATURE_SIZE: usize = 64;

/// Raw (decoded) address length: version byte, RIPEMD-160 digest, checksum.
pub const ADDRESS_DECODED_SIZE: usize = 25;

/// Base32-encoded address length. 25 bytes encode to exactly 40 characters,
/// so there is never any padding to strip.
pub const ADDRESS_ENCODED_SIZE: usize = 40;

// ---------------------------------------------------------------------------
// Field Sizes
// ---------------------------------------------------------------------------

pub const SIZE_SIZE: usize = 4;
pub const VERSION_SIZE: usize = 4;
pub const TYPE_SIZE: usize = 2;
pub const MAX_FEE_SIZE: usize = 8;
pub const DEADLINE_SIZE: usize = 8;
pub const AMOUNT_SIZE: usize = 8;
pub const DURATION_SIZE: usize = 8;
pub const STORAGE_SIZE_SIZE: usize = 8;
pub const COUNT_SIZE: usize = 2;

// ---------------------------------------------------------------------------
// Header Layout
// ---------------------------------------------------------------------------

/// Offset of the signature inside a serialized transaction.
pub const SIGNATURE_OFFSET: usize = SIZE_SIZE;

/// Offset of the signer public key inside a serialized transaction.
pub const SIGNER_OFFSET: usize = SIGNATURE_OFFSET + SIGNATURE_SIZE;

/// Offset of the first byte covered by the signature (the version field).
pub const SIGNABLE_OFFSET: usize = SIGNER_OFFSET + KEY_SIZE;

/// Offset of the entity type discriminant.
pub const TYPE_OFFSET: usize = SIGNABLE_OFFSET + VERSION_SIZE;

/// Full transaction header: size, signature, signer, version, type, max
/// fee, deadline. 122 bytes.
pub const TRANSACTION_HEADER_SIZE: usize = SIZE_SIZE
    + SIGNATURE_SIZE
    + KEY_SIZE
    + VERSION_SIZE
    + TYPE_SIZE
    + MAX_FEE_SIZE
    + DEADLINE_SIZE;

/// Header of a transaction embedded in an aggregate: size, signer, version,
/// type. 42 bytes.
pub const EMBEDDED_HEADER_SIZE: usize = SIZE_SIZE + KEY_SIZE + VERSION_SIZE + TYPE_SIZE;

/// Bytes an embedded transaction saves relative to its standalone form.
pub const EMBEDDED_SIZE_REDUCTION: usize = TRANSACTION_HEADER_SIZE - EMBEDDED_HEADER_SIZE;

// ---------------------------------------------------------------------------
// Variant Header Sizes
// ---------------------------------------------------------------------------

pub const PREPARE_DRIVE_HEADER_SIZE: usize = TRANSACTION_HEADER_SIZE
    + KEY_SIZE
    + DURATION_SIZE
    + DURATION_SIZE
    + AMOUNT_SIZE
    + STORAGE_SIZE_SIZE
    + 2
    + 2
    + 1;

pub const JOIN_TO_DRIVE_HEADER_SIZE: usize = TRANSACTION_HEADER_SIZE + KEY_SIZE;

pub const DRIVE_FILE_SYSTEM_HEADER_SIZE: usize =
    TRANSACTION_HEADER_SIZE + KEY_SIZE + HASH_SIZE + HASH_SIZE + COUNT_SIZE + COUNT_SIZE;

pub const FILES_DEPOSIT_HEADER_SIZE: usize = TRANSACTION_HEADER_SIZE + KEY_SIZE + COUNT_SIZE;

pub const END_DRIVE_HEADER_SIZE: usize = TRANSACTION_HEADER_SIZE + KEY_SIZE;

pub const DRIVE_FILES_REWARD_HEADER_SIZE: usize = TRANSACTION_HEADER_SIZE + COUNT_SIZE;

pub const START_DRIVE_VERIFICATION_HEADER_SIZE: usize = TRANSACTION_HEADER_SIZE + KEY_SIZE;

pub const END_DRIVE_VERIFICATION_HEADER_SIZE: usize = TRANSACTION_HEADER_SIZE;

pub const START_FILE_DOWNLOAD_HEADER_SIZE: usize = TRANSACTION_HEADER_SIZE + KEY_SIZE + COUNT_SIZE;

pub const END_FILE_DOWNLOAD_HEADER_SIZE: usize =
    TRANSACTION_HEADER_SIZE + KEY_SIZE + HASH_SIZE + COUNT_SIZE;

/// Aggregate header: transaction header plus the u32 payload size.
pub const AGGREGATE_BONDED_HEADER_SIZE: usize = TRANSACTION_HEADER_SIZE + SIZE_SIZE;

// Child record sizes.
pub const ADD_ACTION_SIZE: usize = HASH_SIZE + STORAGE_SIZE_SIZE;
pub const REMOVE_ACTION_SIZE: usize = HASH_SIZE;
pub const FILE_SIZE: usize = HASH_SIZE;
pub const DOWNLOAD_FILE_SIZE: usize = HASH_SIZE + STORAGE_SIZE_SIZE;
pub const UPLOAD_INFO_SIZE: usize = KEY_SIZE + AMOUNT_SIZE;
pub const COSIGNATURE_SIZE: usize = KEY_SIZE + SIGNATURE_SIZE;

// ---------------------------------------------------------------------------
// Entity Versions
// ---------------------------------------------------------------------------

pub const PREPARE_DRIVE_VERSION: u32 = 1;
pub const JOIN_TO_DRIVE_VERSION: u32 = 1;
pub const DRIVE_FILE_SYSTEM_VERSION: u32 = 1;
pub const FILES_DEPOSIT_VERSION: u32 = 1;
pub const END_DRIVE_VERSION: u32 = 1;
pub const DRIVE_FILES_REWARD_VERSION: u32 = 1;
pub const START_DRIVE_VERIFICATION_VERSION: u32 = 1;
pub const END_DRIVE_VERIFICATION_VERSION: u32 = 1;
pub const START_FILE_DOWNLOAD_VERSION: u32 = 1;
pub const END_FILE_DOWNLOAD_VERSION: u32 = 1;
pub const AGGREGATE_COMPLETED_VERSION: u32 = 2;
pub const AGGREGATE_BONDED_VERSION: u32 = 2;

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Network epoch (2016-04-01T00:00:00Z) in Unix milliseconds. Deadlines and
/// block timestamps count from here, not from 1970.
pub const NETWORK_EPOCH_UNIX_MS: i64 = 1_459_468_800_000;

/// Default time-to-live used when a caller does not pick a deadline.
pub const DEFAULT_DEADLINE_HOURS: i64 = 1;

// ---------------------------------------------------------------------------
// Namespaces
// ---------------------------------------------------------------------------

/// Deepest allowed namespace path (`root.sub.leaf`).
pub const NAMESPACE_MAX_DEPTH: usize = 3;

/// Longest allowed single namespace part.
pub const NAMESPACE_MAX_PART_LENGTH: usize = 64;

/// Bit forced on for every namespace id.
pub const NAMESPACE_BIT: u32 = 0x8000_0000;

/// Mask applied to the high word of every mosaic id.
pub const MOSAIC_HIGH_MASK: u32 = 0x7FFF_FFFF;

// ---------------------------------------------------------------------------
// Page Mapping
// ---------------------------------------------------------------------------

/// Upper bound on page-decoding workers regardless of core count.
pub const MAX_PAGE_WORKERS: usize = 16;
