// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! RadiumDB: Percolator-style cross-row, cross-table ACID transactions over a
//! distributed, row-atomic, multi-version key-value store.
//!
//! This crate provides the client-side transaction coordinator: it acquires
//! timestamps, buffers mutations, selects a primary column, drives two-phase
//! prewrite/commit with lock-conflict resolution, and orchestrates rollback
//! on partial failure. The backing store, timestamp oracle, and lock cleaner
//! are external collaborators consumed through traits.

pub mod store;
pub mod time;
pub mod txn;

pub use store::{
    Column, ColumnCoordinate, ColumnMutation, CoprocessorClient, Delete, Get, KeyValue, MemStore,
    MutationKind, Put, RowResult, Scan, StoreError, StoreScanner,
};
pub use time::{
    LocalTimestampOracle, SystemWallClock, TimeError, TimestampOracle, WallClock,
};
pub use txn::{
    CounterStats, LockCleaner, LockPayload, MutationBuffer, PrimaryLock, RowMutation, Scanner,
    SecondaryLock, StaticWorkerRegistry, StatsSink, Transaction, TxnClient, TxnClientBuilder,
    TxnError, TxnLock, WorkerRegistry,
};
