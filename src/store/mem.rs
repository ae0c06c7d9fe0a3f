// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! In-memory reference implementation of the coprocessor contract.
//!
//! Each row carries the three shadow column families:
//!
//! - **DATA**: staged values keyed by (column, prewrite_ts)
//! - **LOCK**: at most one live lock per column, holding the serialized lock
//! - **WRITE**: commit records keyed by commit_ts, each referencing the
//!   prewrite timestamp where the committed value lives
//!
//! Row operations take the store-wide write lock, which makes every RPC
//! row-atomic. This store backs tests and single-process deployments; a
//! networked client implementing [`CoprocessorClient`] replaces it in a real
//! cluster.

use std::collections::{BTreeMap, VecDeque};
use std::ops::Bound;

use parking_lot::RwLock;

use crate::txn::TxnLock;

use super::{
    lock_qualifier, Column, ColumnCoordinate, ColumnMutation, CoprocessorClient, Get, KeyValue,
    MutationKind, RowResult, Scan, StoreError, StoreScanner, LOCK_FAMILY,
};

struct LockEntry {
    prewrite_ts: u64,
    bytes: Vec<u8>,
}

struct WriteEntry {
    prewrite_ts: u64,
    kind: MutationKind,
}

#[derive(Default)]
struct RowState {
    data: BTreeMap<(Column, u64), Vec<u8>>,
    locks: BTreeMap<Column, LockEntry>,
    writes: BTreeMap<Column, BTreeMap<u64, WriteEntry>>,
}

impl RowState {
    /// Collects lock cells for requested columns whose lock could shadow a
    /// version visible at `start_ts`. Locks prewritten after `start_ts`
    /// belong to transactions that will commit after it and are not
    /// conflicts.
    fn conflict_lock_cells(&self, row: &[u8], columns: &[Column], start_ts: u64) -> Vec<KeyValue> {
        let mut cells = Vec::new();
        for column in columns {
            if let Some(entry) = self.locks.get(column) {
                if entry.prewrite_ts <= start_ts {
                    cells.push(KeyValue::new(
                        row.to_vec(),
                        LOCK_FAMILY,
                        lock_qualifier(column),
                        entry.prewrite_ts,
                        MutationKind::Put,
                        entry.bytes.clone(),
                    ));
                }
            }
        }
        cells
    }

    /// Reads the latest committed version of each requested column at
    /// `start_ts`: the newest WRITE entry with commit_ts <= start_ts, chased
    /// into DATA at its prewrite timestamp.
    fn read_columns(&self, row: &[u8], columns: &[Column], start_ts: u64) -> Vec<KeyValue> {
        let mut cells = Vec::new();
        for column in columns {
            let Some(versions) = self.writes.get(column) else {
                continue;
            };
            if let Some((_, write)) = versions.range(..=start_ts).next_back() {
                if write.kind == MutationKind::Put {
                    if let Some(value) = self.data.get(&(column.clone(), write.prewrite_ts)) {
                        cells.push(KeyValue::new(
                            row.to_vec(),
                            column.family(),
                            column.qualifier(),
                            write.prewrite_ts,
                            MutationKind::Put,
                            value.clone(),
                        ));
                    }
                }
            }
        }
        cells
    }

    /// Commits each column whose lock is still the one staged at
    /// `prewrite_ts`; columns already resolved by a peer cleaner are skipped.
    fn commit_columns(&mut self, mutations: &[ColumnMutation], prewrite_ts: u64, commit_ts: u64) {
        for mutation in mutations {
            let column = mutation.column();
            let held = self
                .locks
                .get(column)
                .is_some_and(|entry| entry.prewrite_ts == prewrite_ts);
            if !held {
                continue;
            }
            self.locks.remove(column);
            self.writes.entry(column.clone()).or_default().insert(
                commit_ts,
                WriteEntry {
                    prewrite_ts,
                    kind: mutation.kind(),
                },
            );
        }
    }
}

type Rows = BTreeMap<Vec<u8>, RowState>;

/// In-memory backing store implementing the full coprocessor contract.
#[derive(Default)]
pub struct MemStore {
    tables: RwLock<BTreeMap<Vec<u8>, Rows>>,
}

impl MemStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn prewrite_checked(
        &self,
        table: &[u8],
        row: &[u8],
        mutations: &[ColumnMutation],
        prewrite_ts: u64,
        lock_bytes_for: impl Fn(usize, &ColumnMutation) -> Result<Vec<u8>, StoreError>,
    ) -> Result<Option<TxnLock>, StoreError> {
        let mut tables = self.tables.write();
        let row_state = tables
            .entry(table.to_vec())
            .or_default()
            .entry(row.to_vec())
            .or_default();

        // validate every column before staging anything
        for mutation in mutations {
            let column = mutation.column();
            if let Some(entry) = row_state.locks.get(column) {
                let coordinate = ColumnCoordinate::new(table, row, column.clone());
                let lock = TxnLock::from_bytes(coordinate, &entry.bytes)
                    .map_err(|e| StoreError::Remote(format!("undecodable stored lock: {e}")))?;
                return Ok(Some(lock));
            }
            if let Some(versions) = row_state.writes.get(column) {
                if versions.range(prewrite_ts..).next().is_some() {
                    return Err(StoreError::Remote(format!(
                        "write conflict on column {column}: committed at or after ts {prewrite_ts}"
                    )));
                }
            }
        }

        for (i, mutation) in mutations.iter().enumerate() {
            let bytes = lock_bytes_for(i, mutation)?;
            row_state.locks.insert(
                mutation.column().clone(),
                LockEntry { prewrite_ts, bytes },
            );
            if let Some(value) = mutation.value() {
                row_state
                    .data
                    .insert((mutation.column().clone(), prewrite_ts), value.to_vec());
            }
        }
        Ok(None)
    }
}

fn secondary_lock_with_kind(
    kind: MutationKind,
    secondary_lock_bytes: Option<&[u8]>,
) -> Result<Vec<u8>, StoreError> {
    let body = secondary_lock_bytes.ok_or_else(|| {
        StoreError::Remote("prewrite of a secondary column without a secondary lock payload".into())
    })?;
    let mut bytes = Vec::with_capacity(1 + body.len());
    bytes.push(kind.code());
    bytes.extend_from_slice(body);
    Ok(bytes)
}

impl CoprocessorClient for MemStore {
    fn snapshot_get(
        &self,
        table: &[u8],
        get: &Get,
        start_ts: u64,
        ignore_lock: bool,
    ) -> Result<RowResult, StoreError> {
        let tables = self.tables.read();
        let Some(row_state) = tables.get(table).and_then(|rows| rows.get(get.row())) else {
            return Ok(RowResult::empty());
        };
        if !ignore_lock {
            let lock_cells = row_state.conflict_lock_cells(get.row(), get.columns(), start_ts);
            if !lock_cells.is_empty() {
                return Ok(RowResult::new(lock_cells));
            }
        }
        Ok(RowResult::new(row_state.read_columns(
            get.row(),
            get.columns(),
            start_ts,
        )))
    }

    fn prewrite_row(
        &self,
        table: &[u8],
        row: &[u8],
        mutations: &[ColumnMutation],
        prewrite_ts: u64,
        primary_lock_bytes: &[u8],
        secondary_lock_bytes: Option<&[u8]>,
        primary_index: usize,
    ) -> Result<Option<TxnLock>, StoreError> {
        self.prewrite_checked(table, row, mutations, prewrite_ts, |i, mutation| {
            if i == primary_index {
                Ok(primary_lock_bytes.to_vec())
            } else {
                secondary_lock_with_kind(mutation.kind(), secondary_lock_bytes)
            }
        })
    }

    fn prewrite_secondary_row(
        &self,
        table: &[u8],
        row: &[u8],
        mutations: &[ColumnMutation],
        prewrite_ts: u64,
        secondary_lock_bytes: Option<&[u8]>,
    ) -> Result<Option<TxnLock>, StoreError> {
        self.prewrite_checked(table, row, mutations, prewrite_ts, |_, mutation| {
            secondary_lock_with_kind(mutation.kind(), secondary_lock_bytes)
        })
    }

    fn commit_row(
        &self,
        table: &[u8],
        row: &[u8],
        mutations: &[ColumnMutation],
        prewrite_ts: u64,
        commit_ts: u64,
        primary_index: usize,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        let row_state = tables
            .get_mut(table)
            .and_then(|rows| rows.get_mut(row))
            .ok_or(StoreError::LockCleaned)?;
        let primary_column = mutations
            .get(primary_index)
            .ok_or_else(|| StoreError::Remote("primary index out of range".into()))?
            .column();
        let held = row_state
            .locks
            .get(primary_column)
            .is_some_and(|entry| entry.prewrite_ts == prewrite_ts);
        if !held {
            return Err(StoreError::LockCleaned);
        }
        row_state.commit_columns(mutations, prewrite_ts, commit_ts);
        Ok(())
    }

    fn commit_secondary_row(
        &self,
        table: &[u8],
        row: &[u8],
        mutations: &[ColumnMutation],
        prewrite_ts: u64,
        commit_ts: u64,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        if let Some(row_state) = tables.get_mut(table).and_then(|rows| rows.get_mut(row)) {
            row_state.commit_columns(mutations, prewrite_ts, commit_ts);
        }
        Ok(())
    }

    fn erase_lock_and_data(
        &self,
        table: &[u8],
        row: &[u8],
        columns: &[Column],
        prewrite_ts: u64,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        if let Some(row_state) = tables.get_mut(table).and_then(|rows| rows.get_mut(row)) {
            for column in columns {
                let held = row_state
                    .locks
                    .get(column)
                    .is_some_and(|entry| entry.prewrite_ts == prewrite_ts);
                if held {
                    row_state.locks.remove(column);
                }
                row_state.data.remove(&(column.clone(), prewrite_ts));
            }
        }
        Ok(())
    }

    fn scan(
        &self,
        table: &[u8],
        scan: &Scan,
        start_ts: u64,
    ) -> Result<Box<dyn StoreScanner>, StoreError> {
        let tables = self.tables.read();
        let mut results = VecDeque::new();
        if let Some(rows) = tables.get(table) {
            let range =
                rows.range::<[u8], _>((Bound::Included(scan.start_row()), Bound::Unbounded));
            for (row, row_state) in range {
                if !scan.stop_row().is_empty() && row.as_slice() >= scan.stop_row() {
                    break;
                }
                let lock_cells = row_state.conflict_lock_cells(row, scan.columns(), start_ts);
                let result = if lock_cells.is_empty() {
                    RowResult::new(row_state.read_columns(row, scan.columns(), start_ts))
                } else {
                    RowResult::new(lock_cells)
                };
                if !result.is_empty() {
                    results.push_back(result);
                }
            }
        }
        Ok(Box::new(MemScanner { results }))
    }
}

struct MemScanner {
    results: VecDeque<RowResult>,
}

impl StoreScanner for MemScanner {
    fn next(&mut self) -> Result<Option<RowResult>, StoreError> {
        Ok(self.results.pop_front())
    }
}
