// Codec and derivation benchmarks for the Sirius SDK.
//
// Covers address and id derivation, encoding and dispatch-decoding of a
// file system change at various action counts, and drives page mapping
// across worker counts.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use sirius_sdk::asset::{MosaicId, NamespaceId};
use sirius_sdk::identity::{Address, NetworkType, PublicAccount};
use sirius_sdk::mapper::MapperConfig;
use sirius_sdk::storage::DrivesPage;
use sirius_sdk::transaction::{
    map_transaction, map_transaction_bytes, AddAction, Deadline, DriveFileSystemTransaction, Hash,
    RemoveAction, StorageSize, Transaction,
};

const OWNER: &str = "321DE652C4D3362FC2DDF7800F6582F4A10CFEA134B81F8AB6E4BE78BBA4D18E";

fn file_system_change(actions: usize) -> Transaction {
    let drive = PublicAccount::from_public_key_bytes([1; 32], NetworkType::MijinTest);
    DriveFileSystemTransaction::new(
        Deadline::from_millis(1),
        drive,
        Hash([0xAA; 32]),
        Hash([0x0F; 32]),
        (0..actions)
            .map(|i| AddAction {
                file_hash: Hash([i as u8; 32]),
                file_size: StorageSize(i as u64 * 1024),
            })
            .collect(),
        (0..actions)
            .map(|i| RemoveAction {
                file_hash: Hash([!(i as u8); 32]),
            })
            .collect(),
        NetworkType::MijinTest,
    )
    .unwrap()
    .into()
}

fn bench_derivation(c: &mut Criterion) {
    c.bench_function("derive/address", |b| {
        b.iter(|| Address::from_public_key(OWNER, NetworkType::MijinTest).unwrap());
    });
    c.bench_function("derive/mosaic_id", |b| {
        b.iter(|| MosaicId::from_nonce_and_owner(42, OWNER).unwrap());
    });
    c.bench_function("derive/namespace_path", |b| {
        b.iter(|| NamespaceId::namespace_path("prx.storage.units").unwrap());
    });
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec/encode_file_system");

    for actions in [1, 16, 256] {
        let tx = file_system_change(actions);
        group.throughput(Throughput::Bytes(tx.size() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(actions), &tx, |b, tx| {
            b.iter(|| tx.to_bytes().unwrap());
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec/decode_file_system");

    for actions in [1, 16, 256] {
        let tx = file_system_change(actions);
        let bytes = tx.to_bytes().unwrap();
        let json = tx.to_json().unwrap();
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::new("bytes", actions), &bytes, |b, bytes| {
            b.iter(|| map_transaction_bytes(bytes).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("json", actions), &json, |b, json| {
            b.iter(|| map_transaction(json.clone()).unwrap());
        });
    }

    group.finish();
}

fn drives_page(entries: usize) -> Vec<u8> {
    let drive = serde_json::json!({
        "drive": {
            "multisig": OWNER,
            "start": [1, 0],
            "state": 2,
            "owner": OWNER,
            "rootHash": "AA".repeat(32),
            "duration": [100, 0],
            "billingPeriod": [10, 0],
            "billingPrice": [50, 0],
            "size": [4096, 0],
            "occupiedSpace": [0, 0],
            "replicas": 3,
            "minReplicators": 2,
            "percentApprovers": 66,
            "replicators": [{ "replicator": OWNER, "start": [1, 0], "end": [0, 0] }]
        }
    });
    serde_json::to_vec(&serde_json::json!({
        "data": vec![drive; entries],
        "pagination": { "totalEntries": entries, "pageNumber": 1, "pageSize": entries, "totalPages": 1 }
    }))
    .unwrap()
}

fn bench_drives_page(c: &mut Criterion) {
    let mut group = c.benchmark_group("mapper/drives_page_100");
    let page = drives_page(100);

    for workers in [1, 4, 16] {
        let config = MapperConfig::with_workers(workers);
        group.throughput(Throughput::Elements(100));
        group.bench_with_input(BenchmarkId::from_parameter(workers), &config, |b, config| {
            b.iter(|| DrivesPage::from_json(&page, NetworkType::MijinTest, config).unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_derivation,
    bench_encode,
    bench_decode,
    bench_drives_page,
);
criterion_main!(benches);
