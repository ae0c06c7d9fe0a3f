// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Coprocessor client trait definition.
//!
//! The backing store executes the transaction protocol's row-atomic steps
//! server-side; this trait is the client surface the coordinator drives. All
//! calls are blocking and may fail on network I/O. Implementations are shared
//! across transactions and must be safe for concurrent use.

use crate::txn::TxnLock;

use super::{Column, ColumnMutation, Get, RowResult, Scan, StoreError};

/// Client for the backing store's transaction coprocessor.
pub trait CoprocessorClient: Send + Sync {
    /// Snapshot-aware read at `start_ts`.
    ///
    /// With `ignore_lock = false`, conflicting locks (prewritten at or before
    /// `start_ts`) surface as lock cells in the result, detectable via
    /// [`RowResult::is_lock_result`]. With `ignore_lock = true`, locks are
    /// skipped and only committed data visible at `start_ts` is returned.
    fn snapshot_get(
        &self,
        table: &[u8],
        get: &Get,
        start_ts: u64,
        ignore_lock: bool,
    ) -> Result<RowResult, StoreError>;

    /// Row-atomic prewrite of the row containing the primary column.
    ///
    /// Writes DATA@`prewrite_ts` plus a lock for every column, succeeding iff
    /// no column carries a conflicting lock or a WRITE with commit timestamp
    /// at or above `prewrite_ts`. The column at `primary_index` receives
    /// `primary_lock_bytes`; every other column receives
    /// `secondary_lock_bytes` with its own kind byte prepended server-side.
    ///
    /// Returns `Ok(None)` on success or `Ok(Some(lock))` describing a single
    /// conflicting lock.
    #[allow(clippy::too_many_arguments)]
    fn prewrite_row(
        &self,
        table: &[u8],
        row: &[u8],
        mutations: &[ColumnMutation],
        prewrite_ts: u64,
        primary_lock_bytes: &[u8],
        secondary_lock_bytes: Option<&[u8]>,
        primary_index: usize,
    ) -> Result<Option<TxnLock>, StoreError>;

    /// Row-atomic prewrite of a row containing only secondary columns.
    fn prewrite_secondary_row(
        &self,
        table: &[u8],
        row: &[u8],
        mutations: &[ColumnMutation],
        prewrite_ts: u64,
        secondary_lock_bytes: Option<&[u8]>,
    ) -> Result<Option<TxnLock>, StoreError>;

    /// Row-atomic commit of the primary row: writes a WRITE entry at
    /// `commit_ts` referencing `prewrite_ts` for each column and erases the
    /// locks. Fails with [`StoreError::LockCleaned`] when the primary lock
    /// (at `primary_index`) is no longer present.
    fn commit_row(
        &self,
        table: &[u8],
        row: &[u8],
        mutations: &[ColumnMutation],
        prewrite_ts: u64,
        commit_ts: u64,
        primary_index: usize,
    ) -> Result<(), StoreError>;

    /// Row-atomic commit of a secondary row. Columns whose lock has already
    /// been resolved by a peer cleaner are skipped.
    fn commit_secondary_row(
        &self,
        table: &[u8],
        row: &[u8],
        mutations: &[ColumnMutation],
        prewrite_ts: u64,
        commit_ts: u64,
    ) -> Result<(), StoreError>;

    /// Row-atomic, idempotent erasure of the locks and staged data written at
    /// `prewrite_ts` for the given columns. The rollback primitive.
    fn erase_lock_and_data(
        &self,
        table: &[u8],
        row: &[u8],
        columns: &[Column],
        prewrite_ts: u64,
    ) -> Result<(), StoreError>;

    /// Opens a snapshot scan at `start_ts`. Rows with conflicting locks are
    /// reported as lock results, exactly as in [`Self::snapshot_get`].
    fn scan(
        &self,
        table: &[u8],
        scan: &Scan,
        start_ts: u64,
    ) -> Result<Box<dyn StoreScanner>, StoreError>;
}

/// Streaming result of a snapshot scan.
pub trait StoreScanner: Send {
    /// Returns the next non-empty row, or `None` when the scan is exhausted.
    fn next(&mut self) -> Result<Option<RowResult>, StoreError>;
}
