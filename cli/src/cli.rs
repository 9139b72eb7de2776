//! # CLI Interface
//!
//! Command-line structure for `sirius-cli`, defined with `clap` derive.
//! Every subcommand is offline: it derives, decodes or maps what it is
//! given and prints the result to stdout.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use sirius_sdk::identity::NetworkType;

/// Offline companion for the Sirius SDK codec.
#[derive(Parser, Debug)]
#[command(
    name = "sirius-cli",
    about = "Derive Sirius identifiers and decode transactions offline",
    version,
    propagate_version = true
)]
pub struct SiriusCli {
    /// Network used for derivation and decoding.
    #[arg(
        long,
        short = 'n',
        global = true,
        env = "SIRIUS_NETWORK",
        default_value = "mijin-test"
    )]
    pub network: NetworkType,

    /// Log output format. Logs go to stderr.
    #[arg(long, global = true, env = "SIRIUS_LOG_FORMAT", value_enum, default_value_t = LogFormatArg::Pretty)]
    pub log_format: LogFormatArg,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormatArg {
    Pretty,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Derive an address from a public key, or validate an encoded address.
    Address(AddressArgs),
    /// Derive a mosaic id from a nonce and its owner's public key.
    MosaicId(MosaicIdArgs),
    /// Derive a namespace id from a dotted name.
    NamespaceId(NamespaceIdArgs),
    /// Decode a transaction from a hex payload or a JSON envelope.
    Decode(DecodeArgs),
    /// Map a drives page JSON document.
    DecodeDrives(DecodeDrivesArgs),
}

#[derive(Args, Debug)]
pub struct AddressArgs {
    /// Hex public key (64 chars).
    #[arg(required_unless_present = "parse", conflicts_with = "parse")]
    pub public_key: Option<String>,

    /// Encoded address to validate, plain or dash-separated.
    #[arg(long)]
    pub parse: Option<String>,
}

#[derive(Args, Debug)]
pub struct MosaicIdArgs {
    #[arg(long, default_value_t = 0)]
    pub nonce: u32,

    /// Hex public key of the mosaic owner.
    #[arg(long)]
    pub owner: String,
}

#[derive(Args, Debug)]
pub struct NamespaceIdArgs {
    /// Dotted namespace name, e.g. `prx.xpx`.
    #[arg(required_unless_present = "well_known")]
    pub name: Option<String>,

    /// Print the id of every level, root first.
    #[arg(long)]
    pub path: bool,

    /// List the well-known namespaces instead.
    #[arg(long, conflicts_with_all = ["name", "path"])]
    pub well_known: bool,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Hex payload, a file holding one, or a JSON envelope file. `-`
    /// reads stdin.
    pub input: String,
}

#[derive(Args, Debug)]
pub struct DecodeDrivesArgs {
    /// File holding a `{ "data": [...], "pagination": {...} }` document.
    pub file: PathBuf,

    /// Page decoding workers. Defaults to the available cores, capped.
    #[arg(long, short = 'w', env = "SIRIUS_PAGE_WORKERS")]
    pub workers: Option<usize>,
}
