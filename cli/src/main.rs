// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Sirius CLI
//!
//! Entry point for the `sirius-cli` binary. Parses arguments, sets up
//! logging and runs one offline subcommand:
//!
//! - `address`       — derive or validate an address
//! - `mosaic-id`     — derive a mosaic id from nonce and owner
//! - `namespace-id`  — derive namespace ids from a dotted name
//! - `decode`        — decode a hex payload or JSON envelope
//! - `decode-drives` — map a drives page on the worker pool
//!
//! Results are printed to stdout as JSON.

mod cli;
mod logging;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::{json, Value};
use std::io::Read;
use std::path::Path;

use sirius_sdk::asset::{MosaicId, NamespaceId, WellKnown};
use sirius_sdk::identity::{Address, NetworkType};
use sirius_sdk::mapper::MapperConfig;
use sirius_sdk::storage::DrivesPage;
use sirius_sdk::transaction::{map_transaction_bytes, map_transaction_str, Transaction};

use cli::{Commands, SiriusCli};

fn main() -> Result<()> {
    let cli = SiriusCli::parse();
    logging::init_logging(logging::DEFAULT_FILTER, cli.log_format);

    let output = match cli.command {
        Commands::Address(args) => address(args, cli.network)?,
        Commands::MosaicId(args) => mosaic_id(args)?,
        Commands::NamespaceId(args) => namespace_id(args)?,
        Commands::Decode(args) => decode(&read_input(&args.input)?)?,
        Commands::DecodeDrives(args) => decode_drives(args, cli.network)?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn address_json(address: &Address) -> Value {
    json!({
        "address": address.as_str(),
        "pretty": address.pretty(),
        "network": address.network_type().to_string(),
        "hex": address.to_hex(),
    })
}

fn address(args: cli::AddressArgs, network: NetworkType) -> Result<Value> {
    let address = match (args.public_key, args.parse) {
        (_, Some(encoded)) => Address::from_encoded(&encoded)
            .with_context(|| format!("'{encoded}' is not a valid address"))?,
        (Some(key), None) => Address::from_public_key(&key, network)
            .with_context(|| format!("cannot derive an address from '{key}'"))?,
        (None, None) => bail!("pass a public key or --parse <ADDRESS>"),
    };
    tracing::debug!(%address, "address resolved");
    Ok(address_json(&address))
}

fn mosaic_id(args: cli::MosaicIdArgs) -> Result<Value> {
    let id = MosaicId::from_nonce_and_owner(args.nonce, &args.owner)
        .context("cannot derive mosaic id")?;
    Ok(json!({ "nonce": args.nonce, "id": id.to_hex(), "dto": id.to_dto() }))
}

fn namespace_id(args: cli::NamespaceIdArgs) -> Result<Value> {
    if args.well_known {
        let known: Vec<Value> = WellKnown::ALL
            .into_iter()
            .map(|known| json!({ "name": known.name(), "id": known.id().to_hex() }))
            .collect();
        return Ok(Value::Array(known));
    }

    let name = args.name.context("a namespace name is required")?;
    let path = NamespaceId::namespace_path(&name)
        .with_context(|| format!("'{name}' is not a valid namespace name"))?;
    if args.path {
        let levels = name
            .split('.')
            .zip(&path)
            .map(|(part, id)| json!({ "part": part, "id": id.to_hex(), "dto": id.to_dto() }))
            .collect();
        return Ok(Value::Array(levels));
    }

    let leaf = path.last().context("namespace path is empty")?;
    Ok(json!({ "name": name, "id": leaf.to_hex(), "dto": leaf.to_dto() }))
}

/// Reads `-` as stdin, an existing path as a file, anything else verbatim.
fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    let path = Path::new(input);
    if path.is_file() {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()));
    }
    Ok(input.to_string())
}

fn decode(input: &str) -> Result<Value> {
    let input = input.trim();
    let tx: Transaction = if input.starts_with('{') {
        map_transaction_str(input).context("failed to map transaction json")?
    } else {
        let bytes = hex::decode(input).context("input is neither a JSON envelope nor hex")?;
        map_transaction_bytes(&bytes).context("failed to decode transaction bytes")?
    };

    tracing::info!(entity_type = %tx.entity_type(), size = tx.size(), "decoded transaction");
    Ok(json!({
        "entityType": tx.entity_type().to_string(),
        "size": tx.size(),
        "envelope": tx.to_json()?,
    }))
}

fn decode_drives(args: cli::DecodeDrivesArgs, network: NetworkType) -> Result<Value> {
    let json = std::fs::read(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let config = args
        .workers
        .map(MapperConfig::with_workers)
        .unwrap_or_default();

    let page = DrivesPage::from_json(&json, network, &config)
        .with_context(|| format!("failed to map drives page {}", args.file.display()))?;
    tracing::info!(drives = page.drives.len(), workers = config.workers, "drives page mapped");

    let drives: Vec<Value> = page
        .drives
        .iter()
        .map(|drive| {
            json!({
                "drive": drive.drive_account.public_key_hex(),
                "owner": drive.owner_account.address().as_str(),
                "state": drive.state.to_string(),
                "rootHash": drive.root_hash,
                "size": drive.drive_size,
                "occupiedSpace": drive.occupied_space,
                "replicators": drive.replicators.len(),
                "files": drive.files.len(),
            })
        })
        .collect();

    Ok(json!({ "drives": drives, "pagination": page.pagination }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const OWNER: &str = "321DE652C4D3362FC2DDF7800F6582F4A10CFEA134B81F8AB6E4BE78BBA4D18E";

    #[test]
    fn address_from_key_and_back() {
        let derived = address(
            cli::AddressArgs {
                public_key: Some(OWNER.to_string()),
                parse: None,
            },
            NetworkType::MijinTest,
        )
        .unwrap();
        assert_eq!(derived["address"], "SBFBW6TUGLEWQIBCMTBMXXQORZKUP3WTVVTOKK5M");

        let parsed = address(
            cli::AddressArgs {
                public_key: None,
                parse: Some(derived["pretty"].as_str().unwrap().to_string()),
            },
            NetworkType::Public,
        )
        .unwrap();
        assert_eq!(parsed["network"], "mijin-test");
    }

    #[test]
    fn namespace_path_output() {
        let out = namespace_id(cli::NamespaceIdArgs {
            name: Some("prx.xpx".to_string()),
            path: true,
            well_known: false,
        })
        .unwrap();
        assert_eq!(out[0]["id"], "B16D77FD8B6FB3BE");
        assert_eq!(out[1]["id"], "BFFB42A19116BDF6");
    }

    #[test]
    fn decode_reads_hex_file() {
        let drive = sirius_sdk::PublicAccount::from_public_key(OWNER, NetworkType::MijinTest).unwrap();
        let tx: Transaction = sirius_sdk::transaction::EndDriveTransaction::new(
            sirius_sdk::transaction::Deadline::from_millis(1),
            drive,
            NetworkType::MijinTest,
        )
        .into();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", hex::encode(tx.to_bytes().unwrap())).unwrap();

        let input = read_input(file.path().to_str().unwrap()).unwrap();
        let out = decode(&input).unwrap();
        assert_eq!(out["size"], 154);
        assert_eq!(out["envelope"]["transaction"]["driveKey"], OWNER);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode("not hex").is_err());
        assert!(decode("{\"transaction\": {}}").is_err());
    }
}
