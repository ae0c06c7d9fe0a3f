// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Percolator-style transaction layer.
//!
//! This module provides cross-row, cross-table ACID transactions on top of a
//! row-atomic, multi-version backing store with:
//! - Snapshot-isolated reads at a transaction-wide start timestamp
//! - Two-phase prewrite/commit anchored by a primary column, whose
//!   LOCK->WRITE transition is the single atomic commit point
//! - Conflict-lock resolution through a pluggable lock cleaner
//!
//! # Key Concepts
//!
//! ## Primary and secondary columns
//!
//! One buffered column is selected as the transaction's primary; every other
//! column's lock references it. A transaction is committed exactly when its
//! primary column carries a WRITE record, no matter how many secondary locks
//! are still lying around: readers roll those forward or back by consulting
//! the primary.
//!
//! ## Commit timestamp ordering
//!
//! The commit timestamp is fetched from the oracle only after every prewrite
//! has succeeded, so any transaction that should have observed this one's
//! locks is ordered after it.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use radiumdb::store::{Get, MemStore, Put};
//! use radiumdb::txn::{LockCleaner, TxnClient};
//!
//! # fn example(cleaner: Arc<dyn LockCleaner>) -> Result<(), radiumdb::txn::TxnError> {
//! let store = Arc::new(MemStore::new());
//! let client = TxnClient::builder(store, cleaner).build()?;
//!
//! let mut txn = client.begin()?;
//! txn.put(b"accounts", &Put::new("alice").add_column("cf", "balance", "90"))?;
//! txn.put(b"accounts", &Put::new("bob").add_column("cf", "balance", "110"))?;
//! txn.commit()?;
//!
//! let reader = client.begin()?;
//! let result = reader.get(b"accounts", &Get::new("alice").add_column("cf", "balance"))?;
//! println!("balance: {:?}", result.value(b"cf", b"balance"));
//! # Ok(())
//! # }
//! ```

mod buffer;
mod cleaner;
mod client;
mod error;
mod lock;
mod plan;
mod scanner;
mod stats;
mod transaction;
mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use buffer::{MutationBuffer, RowMutation};
pub use cleaner::LockCleaner;
pub use client::{TxnClient, TxnClientBuilder};
pub use error::TxnError;
pub use lock::{LockPayload, PrimaryLock, SecondaryLock, TxnLock};
pub use scanner::Scanner;
pub use stats::{CounterStats, StatsSink};
pub use transaction::Transaction;
pub use worker::{StaticWorkerRegistry, WorkerRegistry};
