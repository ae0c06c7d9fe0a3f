// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Transaction client: owns the shared collaborators and opens transactions.

use std::sync::Arc;

use crate::store::CoprocessorClient;
use crate::time::{LocalTimestampOracle, SystemWallClock, TimestampOracle, WallClock};

use super::cleaner::LockCleaner;
use super::error::TxnError;
use super::stats::{CounterStats, StatsSink};
use super::transaction::Transaction;
use super::worker::{StaticWorkerRegistry, WorkerRegistry};

/// The collaborators shared by every transaction a client opens.
///
/// All of them outlive individual transactions and are safe for concurrent
/// use; a transaction borrows them without taking ownership.
pub(crate) struct Collaborators {
    pub(crate) store: Arc<dyn CoprocessorClient>,
    pub(crate) oracle: Arc<dyn TimestampOracle>,
    pub(crate) wall_clock: Arc<dyn WallClock>,
    pub(crate) registry: Arc<dyn WorkerRegistry>,
    pub(crate) cleaner: Arc<dyn LockCleaner>,
    pub(crate) stats: Arc<dyn StatsSink>,
}

/// Factory for transactions against one backing store.
///
/// Registers the worker once at construction; [`TxnClient::begin`] then only
/// costs one oracle round-trip per transaction.
pub struct TxnClient {
    shared: Arc<Collaborators>,
}

impl TxnClient {
    /// Starts building a client around a store client and a lock cleaner.
    /// The remaining collaborators default to process-local implementations.
    pub fn builder(
        store: Arc<dyn CoprocessorClient>,
        cleaner: Arc<dyn LockCleaner>,
    ) -> TxnClientBuilder {
        TxnClientBuilder {
            store,
            cleaner,
            oracle: None,
            wall_clock: None,
            registry: None,
            stats: None,
        }
    }

    /// Opens a transaction at a fresh snapshot timestamp.
    pub fn begin(&self) -> Result<Transaction, TxnError> {
        let start_ts = self.shared.oracle.start_ts()?;
        Ok(Transaction::new(self.shared.clone(), start_ts))
    }
}

/// Builder assembling a [`TxnClient`]'s collaborators.
pub struct TxnClientBuilder {
    store: Arc<dyn CoprocessorClient>,
    cleaner: Arc<dyn LockCleaner>,
    oracle: Option<Arc<dyn TimestampOracle>>,
    wall_clock: Option<Arc<dyn WallClock>>,
    registry: Option<Arc<dyn WorkerRegistry>>,
    stats: Option<Arc<dyn StatsSink>>,
}

impl TxnClientBuilder {
    /// Uses the given timestamp oracle instead of a process-local one.
    #[must_use]
    pub fn oracle(mut self, oracle: Arc<dyn TimestampOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// Uses the given wall clock instead of the system clock.
    #[must_use]
    pub fn wall_clock(mut self, wall_clock: Arc<dyn WallClock>) -> Self {
        self.wall_clock = Some(wall_clock);
        self
    }

    /// Uses the given worker registry instead of a static one.
    #[must_use]
    pub fn registry(mut self, registry: Arc<dyn WorkerRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Uses the given stats sink instead of a private counter.
    #[must_use]
    pub fn stats(mut self, stats: Arc<dyn StatsSink>) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Registers the worker and builds the client.
    pub fn build(self) -> Result<TxnClient, TxnError> {
        let registry = self
            .registry
            .unwrap_or_else(|| Arc::new(StaticWorkerRegistry::default()));
        registry.register_worker()?;
        Ok(TxnClient {
            shared: Arc::new(Collaborators {
                store: self.store,
                oracle: self
                    .oracle
                    .unwrap_or_else(|| Arc::new(LocalTimestampOracle::new())),
                wall_clock: self.wall_clock.unwrap_or_else(|| Arc::new(SystemWallClock)),
                registry,
                cleaner: self.cleaner,
                stats: self.stats.unwrap_or_else(|| Arc::new(CounterStats::new())),
            }),
        })
    }
}
