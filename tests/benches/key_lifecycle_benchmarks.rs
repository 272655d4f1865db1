//! # Key Lifecycle Benchmarks
//!
//! | Area | Operation |
//! |------|-----------|
//! | Validation | format check per key type |
//! | Generation | random key value |
//! | Local store | insert, lookup by value, list by owner |

use chrono::DateTime;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pk_01_key_lifecycle::adapters::InMemoryKeyStore;
use pk_01_key_lifecycle::domain::{generator, validation};
use pk_01_key_lifecycle::{KeyStore, NewKeyRecord};
use shared_types::{AccountType, KeyType};

fn bench_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("pk-01-validation");

    let samples = [
        (KeyType::TaxId, "30897274040"),
        (KeyType::Phone, "+5511940028922"),
        (KeyType::Email, "jubileu.silva@gmail.com"),
        (KeyType::Random, ""),
    ];
    for (key_type, value) in samples {
        group.bench_with_input(
            BenchmarkId::new("is_valid", key_type.as_str()),
            &value,
            |b, value| b.iter(|| black_box(validation::is_valid(key_type, value))),
        );
    }

    group.finish();
}

fn bench_generation(c: &mut Criterion) {
    c.bench_function("pk-01-generate-random", |b| {
        b.iter(|| black_box(generator::generate(KeyType::Random, "")))
    });
}

fn record(owner: usize, n: usize) -> NewKeyRecord {
    NewKeyRecord {
        owner_id: format!("owner-{owner}"),
        key_type: KeyType::Email,
        value: format!("user{n}@gmail.com"),
        account_type: AccountType::Checking,
        created_at: DateTime::UNIX_EPOCH,
    }
}

fn bench_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("pk-01-in-memory-store");

    for size in [100usize, 1_000, 10_000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("insert", size), &size, |b, &size| {
            b.iter(|| {
                let store = InMemoryKeyStore::new();
                for n in 0..size {
                    store.insert(record(n % 10, n)).unwrap();
                }
                black_box(store.len())
            })
        });

        let store = InMemoryKeyStore::new();
        for n in 0..size {
            store.insert(record(n % 10, n)).unwrap();
        }
        let probe = format!("user{}@gmail.com", size / 2);
        group.bench_with_input(BenchmarkId::new("find_by_value", size), &probe, |b, probe| {
            b.iter(|| black_box(store.find_by_value(probe).unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("find_by_owner", size), &size, |b, _| {
            b.iter(|| black_box(store.find_by_owner("owner-3").unwrap().len()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_validation, bench_generation, bench_store);
criterion_main!(benches);
