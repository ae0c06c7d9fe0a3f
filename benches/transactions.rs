// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Benchmarks for the transaction commit path against the in-memory store.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use radiumdb::store::{Column, Get, KeyValue, MemStore, Put};
use radiumdb::txn::{LockCleaner, TxnClient, TxnError, TxnLock};

/// Cleaner for conflict-free benchmark workloads; erases through the store.
struct ErasingCleaner {
    store: Arc<MemStore>,
}

impl LockCleaner for ErasingCleaner {
    fn clean_locks(&self, _table: &[u8], _lock_cells: &[KeyValue]) -> Result<(), TxnError> {
        Ok(())
    }

    fn clean_lock(&self, _lock: &TxnLock) -> Result<(), TxnError> {
        Ok(())
    }

    fn erase_lock_and_data(
        &self,
        table: &[u8],
        row: &[u8],
        columns: &[Column],
        prewrite_ts: u64,
    ) -> Result<(), TxnError> {
        use radiumdb::store::CoprocessorClient;
        self.store
            .erase_lock_and_data(table, row, columns, prewrite_ts)?;
        Ok(())
    }
}

fn create_client() -> (TxnClient, Arc<MemStore>) {
    let store = Arc::new(MemStore::new());
    let cleaner = Arc::new(ErasingCleaner {
        store: store.clone(),
    });
    let client = TxnClient::builder(store.clone(), cleaner)
        .build()
        .expect("build client");
    (client, store)
}

fn bench_begin(c: &mut Criterion) {
    let (client, _store) = create_client();

    c.bench_function("txn::begin", |b| {
        b.iter(|| {
            let txn = client.begin().unwrap();
            black_box(txn)
        })
    });
}

fn bench_single_column_commit(c: &mut Criterion) {
    let (client, _store) = create_client();
    let counter = AtomicU64::new(0);

    let mut group = c.benchmark_group("txn::commit");
    group.throughput(Throughput::Elements(1));
    group.bench_function("single_column", |b| {
        b.iter_batched(
            || {
                let i = counter.fetch_add(1, Ordering::Relaxed);
                let mut txn = client.begin().unwrap();
                txn.put(
                    b"bench",
                    &Put::new(format!("row{i}")).add_column("cf", "q", vec![0u8; 100]),
                )
                .unwrap();
                txn
            },
            |txn| txn.commit().unwrap(),
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_cross_row_commit(c: &mut Criterion) {
    let (client, _store) = create_client();
    let counter = AtomicU64::new(0);

    let mut group = c.benchmark_group("txn::commit");
    group.throughput(Throughput::Elements(8));
    group.bench_function("cross_row_8", |b| {
        b.iter_batched(
            || {
                let i = counter.fetch_add(1, Ordering::Relaxed);
                let mut txn = client.begin().unwrap();
                for j in 0..8 {
                    txn.put(
                        b"bench",
                        &Put::new(format!("row{i}-{j}")).add_column("cf", "q", vec![0u8; 100]),
                    )
                    .unwrap();
                }
                txn
            },
            |txn| txn.commit().unwrap(),
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_snapshot_get(c: &mut Criterion) {
    let (client, _store) = create_client();

    let mut txn = client.begin().unwrap();
    txn.put(b"bench", &Put::new("row").add_column("cf", "q", vec![0u8; 100]))
        .unwrap();
    txn.commit().unwrap();

    let reader = client.begin().unwrap();
    let get = Get::new("row").add_column("cf", "q");

    c.bench_function("txn::get", |b| {
        b.iter(|| {
            let result = reader.get(b"bench", &get).unwrap();
            black_box(result)
        })
    });
}

criterion_group!(
    benches,
    bench_begin,
    bench_single_column_commit,
    bench_cross_row_commit,
    bench_snapshot_get
);
criterion_main!(benches);
