// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Test doubles shared by the txn test modules.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::store::{
    column_from_lock_qualifier, lock_qualifier, Column, ColumnCoordinate, ColumnMutation,
    CoprocessorClient, Get, KeyValue, MemStore, MutationKind, RowResult, Scan, StoreError,
    StoreScanner, LOCK_FAMILY,
};
use crate::time::{LocalTimestampOracle, TimeError, TimestampOracle};

use super::cleaner::LockCleaner;
use super::error::TxnError;
use super::lock::{LockPayload, PrimaryLock, TxnLock};

/// One RPC observed by the scripted client, in issue order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum OpRecord {
    Get {
        ignore_lock: bool,
    },
    PrewriteRow {
        row: Vec<u8>,
        primary_index: usize,
        secondary_lock: Option<Vec<u8>>,
    },
    PrewriteSecondaryRow {
        row: Vec<u8>,
        secondary_lock: Option<Vec<u8>>,
    },
    CommitTs,
    CommitRow {
        row: Vec<u8>,
        commit_ts: u64,
    },
    CommitSecondaryRow {
        row: Vec<u8>,
        commit_ts: u64,
    },
    Erase {
        row: Vec<u8>,
    },
}

/// Store client that records every RPC and replays scripted outcomes.
/// Unscripted calls succeed with empty results.
#[derive(Default)]
pub(crate) struct ScriptedClient {
    log: Mutex<Vec<OpRecord>>,
    get_results: Mutex<VecDeque<Result<RowResult, StoreError>>>,
    prewrite_results: Mutex<HashMap<Vec<u8>, VecDeque<Result<Option<TxnLock>, StoreError>>>>,
    commit_row_results: Mutex<VecDeque<Result<(), StoreError>>>,
    commit_secondary_results: Mutex<HashMap<Vec<u8>, VecDeque<Result<(), StoreError>>>>,
}

impl ScriptedClient {
    pub(crate) fn ops(&self) -> Vec<OpRecord> {
        self.log.lock().clone()
    }

    pub(crate) fn record(&self, op: OpRecord) {
        self.log.lock().push(op);
    }

    pub(crate) fn push_get(&self, result: Result<RowResult, StoreError>) {
        self.get_results.lock().push_back(result);
    }

    pub(crate) fn push_prewrite(&self, row: &[u8], result: Result<Option<TxnLock>, StoreError>) {
        self.prewrite_results
            .lock()
            .entry(row.to_vec())
            .or_default()
            .push_back(result);
    }

    pub(crate) fn push_commit_row(&self, result: Result<(), StoreError>) {
        self.commit_row_results.lock().push_back(result);
    }

    pub(crate) fn push_commit_secondary(&self, row: &[u8], result: Result<(), StoreError>) {
        self.commit_secondary_results
            .lock()
            .entry(row.to_vec())
            .or_default()
            .push_back(result);
    }

    fn pop_prewrite(&self, row: &[u8]) -> Result<Option<TxnLock>, StoreError> {
        self.prewrite_results
            .lock()
            .get_mut(row)
            .and_then(VecDeque::pop_front)
            .unwrap_or(Ok(None))
    }
}

impl CoprocessorClient for ScriptedClient {
    fn snapshot_get(
        &self,
        _table: &[u8],
        _get: &Get,
        _start_ts: u64,
        ignore_lock: bool,
    ) -> Result<RowResult, StoreError> {
        self.record(OpRecord::Get { ignore_lock });
        self.get_results
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(RowResult::empty()))
    }

    fn prewrite_row(
        &self,
        _table: &[u8],
        row: &[u8],
        _mutations: &[ColumnMutation],
        _prewrite_ts: u64,
        _primary_lock_bytes: &[u8],
        secondary_lock_bytes: Option<&[u8]>,
        primary_index: usize,
    ) -> Result<Option<TxnLock>, StoreError> {
        self.record(OpRecord::PrewriteRow {
            row: row.to_vec(),
            primary_index,
            secondary_lock: secondary_lock_bytes.map(<[u8]>::to_vec),
        });
        self.pop_prewrite(row)
    }

    fn prewrite_secondary_row(
        &self,
        _table: &[u8],
        row: &[u8],
        _mutations: &[ColumnMutation],
        _prewrite_ts: u64,
        secondary_lock_bytes: Option<&[u8]>,
    ) -> Result<Option<TxnLock>, StoreError> {
        self.record(OpRecord::PrewriteSecondaryRow {
            row: row.to_vec(),
            secondary_lock: secondary_lock_bytes.map(<[u8]>::to_vec),
        });
        self.pop_prewrite(row)
    }

    fn commit_row(
        &self,
        _table: &[u8],
        row: &[u8],
        _mutations: &[ColumnMutation],
        _prewrite_ts: u64,
        commit_ts: u64,
        _primary_index: usize,
    ) -> Result<(), StoreError> {
        self.record(OpRecord::CommitRow {
            row: row.to_vec(),
            commit_ts,
        });
        self.commit_row_results
            .lock()
            .pop_front()
            .unwrap_or(Ok(()))
    }

    fn commit_secondary_row(
        &self,
        _table: &[u8],
        row: &[u8],
        _mutations: &[ColumnMutation],
        _prewrite_ts: u64,
        commit_ts: u64,
    ) -> Result<(), StoreError> {
        self.record(OpRecord::CommitSecondaryRow {
            row: row.to_vec(),
            commit_ts,
        });
        self.commit_secondary_results
            .lock()
            .get_mut(row)
            .and_then(VecDeque::pop_front)
            .unwrap_or(Ok(()))
    }

    fn erase_lock_and_data(
        &self,
        _table: &[u8],
        row: &[u8],
        _columns: &[Column],
        _prewrite_ts: u64,
    ) -> Result<(), StoreError> {
        self.record(OpRecord::Erase { row: row.to_vec() });
        Ok(())
    }

    fn scan(
        &self,
        _table: &[u8],
        _scan: &Scan,
        _start_ts: u64,
    ) -> Result<Box<dyn StoreScanner>, StoreError> {
        Err(StoreError::Remote("scan is not scripted".to_string()))
    }
}

/// Cleaner that records what it was asked to resolve and erases through the
/// scripted client so rollback RPCs land in the same op log.
pub(crate) struct ScriptedCleaner {
    client: Arc<ScriptedClient>,
    cleaned_locks: Mutex<Vec<ColumnCoordinate>>,
    cleaned_batches: Mutex<usize>,
    clean_failures: Mutex<VecDeque<TxnError>>,
}

impl ScriptedCleaner {
    pub(crate) fn new(client: Arc<ScriptedClient>) -> Self {
        Self {
            client,
            cleaned_locks: Mutex::new(Vec::new()),
            cleaned_batches: Mutex::new(0),
            clean_failures: Mutex::new(VecDeque::new()),
        }
    }

    pub(crate) fn push_clean_failure(&self, error: TxnError) {
        self.clean_failures.lock().push_back(error);
    }

    pub(crate) fn cleaned_locks(&self) -> Vec<ColumnCoordinate> {
        self.cleaned_locks.lock().clone()
    }

    pub(crate) fn cleaned_batches(&self) -> usize {
        *self.cleaned_batches.lock()
    }

    fn next_failure(&self) -> Result<(), TxnError> {
        match self.clean_failures.lock().pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl LockCleaner for ScriptedCleaner {
    fn clean_locks(&self, _table: &[u8], _lock_cells: &[KeyValue]) -> Result<(), TxnError> {
        *self.cleaned_batches.lock() += 1;
        self.next_failure()
    }

    fn clean_lock(&self, lock: &TxnLock) -> Result<(), TxnError> {
        self.cleaned_locks.lock().push(lock.column().clone());
        self.next_failure()
    }

    fn erase_lock_and_data(
        &self,
        table: &[u8],
        row: &[u8],
        columns: &[Column],
        prewrite_ts: u64,
    ) -> Result<(), TxnError> {
        self.client
            .erase_lock_and_data(table, row, columns, prewrite_ts)?;
        Ok(())
    }
}

/// Oracle that stamps a `CommitTs` marker into the scripted client's op log,
/// so commit-timestamp ordering is checkable against the RPC sequence.
pub(crate) struct LoggingOracle {
    client: Arc<ScriptedClient>,
    inner: LocalTimestampOracle,
}

impl LoggingOracle {
    pub(crate) fn new(client: Arc<ScriptedClient>, first_ts: u64) -> Self {
        Self {
            client,
            inner: LocalTimestampOracle::starting_at(first_ts),
        }
    }
}

impl TimestampOracle for LoggingOracle {
    fn start_ts(&self) -> Result<u64, TimeError> {
        self.inner.start_ts()
    }

    fn commit_ts(&self) -> Result<u64, TimeError> {
        self.client.record(OpRecord::CommitTs);
        self.inner.commit_ts()
    }
}

/// Cleaner that rolls every conflicting lock back by erasing it, for tests
/// where lock owners are known to be dead.
pub(crate) struct ErasingCleaner {
    store: Arc<MemStore>,
}

impl ErasingCleaner {
    pub(crate) fn new(store: Arc<MemStore>) -> Self {
        Self { store }
    }
}

impl LockCleaner for ErasingCleaner {
    fn clean_locks(&self, table: &[u8], lock_cells: &[KeyValue]) -> Result<(), TxnError> {
        for cell in lock_cells {
            let column = column_from_lock_qualifier(&cell.qualifier)?;
            self.store
                .erase_lock_and_data(table, &cell.row, &[column], cell.timestamp)?;
        }
        Ok(())
    }

    fn clean_lock(&self, lock: &TxnLock) -> Result<(), TxnError> {
        let coordinate = lock.column();
        self.store.erase_lock_and_data(
            coordinate.table(),
            coordinate.row(),
            &[coordinate.column().clone()],
            lock.prewrite_ts(),
        )?;
        Ok(())
    }

    fn erase_lock_and_data(
        &self,
        table: &[u8],
        row: &[u8],
        columns: &[Column],
        prewrite_ts: u64,
    ) -> Result<(), TxnError> {
        self.store
            .erase_lock_and_data(table, row, columns, prewrite_ts)?;
        Ok(())
    }
}

/// A conflict lock sitting on a data column, as prewrite would return it.
pub(crate) fn data_conflict_lock(table: &[u8], row: &[u8], prewrite_ts: u64) -> TxnLock {
    conflict_lock_at(
        ColumnCoordinate::new(table, row, Column::new("cf", "q")),
        prewrite_ts,
    )
}

/// A conflict lock claiming to sit on a LOCK-family column, which a correct
/// server must never return.
pub(crate) fn non_data_conflict_lock(table: &[u8], row: &[u8], prewrite_ts: u64) -> TxnLock {
    conflict_lock_at(
        ColumnCoordinate::new(table, row, Column::new(LOCK_FAMILY, "q")),
        prewrite_ts,
    )
}

fn conflict_lock_at(column: ColumnCoordinate, prewrite_ts: u64) -> TxnLock {
    TxnLock::new(
        column,
        LockPayload::Primary(PrimaryLock {
            kind: MutationKind::Put,
            prewrite_ts,
            wall_time: 1,
            client_address: b"peer-worker".to_vec(),
            secondaries: Vec::new(),
        }),
    )
}

/// A read result carrying one conflict lock cell for `row`.
pub(crate) fn lock_result(row: &[u8], prewrite_ts: u64) -> RowResult {
    let column = Column::new("cf", "q");
    let lock_bytes = PrimaryLock {
        kind: MutationKind::Put,
        prewrite_ts,
        wall_time: 1,
        client_address: b"peer-worker".to_vec(),
        secondaries: Vec::new(),
    }
    .to_bytes();
    RowResult::new(vec![KeyValue::new(
        row.to_vec(),
        LOCK_FAMILY,
        lock_qualifier(&column),
        prewrite_ts,
        MutationKind::Put,
        lock_bytes,
    )])
}
