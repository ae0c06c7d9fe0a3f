// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! The transaction coordinator.
//!
//! A transaction buffers reads and writes against a snapshot at `start_ts`
//! and commits through the two-phase prewrite/commit protocol anchored by a
//! primary column:
//!
//! 1. Prewrite the primary row, then every secondary row, staging
//!    DATA@start_ts plus a lock per column. Conflicting locks are handed to
//!    the lock cleaner once per row; a second conflict aborts.
//! 2. Fetch `commit_ts`, only after every prewrite succeeded.
//! 3. Commit the primary row. The primary's LOCK->WRITE transition is the
//!    transaction's single atomic commit point.
//! 4. Commit secondary rows best-effort; leftovers are rolled forward later
//!    by whichever reader trips over them.
//!
//! The coordinator is single-threaded per transaction and issues blocking
//! RPCs sequentially. Collaborators (store client, oracle, clock, registry,
//! cleaner, stats) are shared across transactions.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::store::{ColumnCoordinate, Delete, Get, KeyValue, Put, RowResult, Scan, StoreError};

use super::buffer::{MutationBuffer, RowMutation};
use super::client::Collaborators;
use super::error::TxnError;
use super::lock::TxnLock;
use super::plan::CommitPlan;
use super::scanner::Scanner;

/// A single-use, snapshot-isolated transaction.
///
/// Created through [`super::TxnClient::begin`]. Reads observe the snapshot at
/// `start_ts`; writes are buffered locally and take effect only when
/// [`Transaction::commit`] succeeds. The object is consumed by `commit`;
/// retrying after a failure means starting a fresh transaction.
pub struct Transaction {
    shared: Arc<Collaborators>,
    start_ts: u64,
    buffer: MutationBuffer,
    preferred_primary: Option<ColumnCoordinate>,
}

impl Transaction {
    pub(crate) fn new(shared: Arc<Collaborators>, start_ts: u64) -> Self {
        Self {
            shared,
            start_ts,
            buffer: MutationBuffer::new(),
            preferred_primary: None,
        }
    }

    /// Returns this transaction's snapshot timestamp.
    #[inline]
    pub fn start_ts(&self) -> u64 {
        self.start_ts
    }

    /// Returns the number of buffered (table, row, column) mutations.
    #[inline]
    pub fn mutation_count(&self) -> usize {
        self.buffer.size()
    }

    /// Pins the preferred primary column for commit.
    ///
    /// Planning adopts the pinned column iff it is present in the buffer;
    /// commit fails with [`TxnError::InvalidState`] otherwise. Intended for
    /// tests and callers that want a deterministic recovery anchor.
    pub fn set_primary(&mut self, column: ColumnCoordinate) {
        self.preferred_primary = Some(column);
    }

    /// Buffers a write.
    pub fn put(&mut self, table: &[u8], put: &Put) -> Result<(), TxnError> {
        ensure_has_columns("put", put.has_columns())?;
        for kv in put.key_values() {
            self.buffer.add(table, kv);
        }
        Ok(())
    }

    /// Buffers a delete.
    pub fn delete(&mut self, table: &[u8], delete: &Delete) -> Result<(), TxnError> {
        ensure_has_columns("delete", delete.has_columns())?;
        for kv in delete.key_values() {
            self.buffer.add(table, kv);
        }
        Ok(())
    }

    /// Reads a row at this transaction's snapshot.
    ///
    /// A read that trips over conflicting locks hands them to the cleaner and
    /// retries exactly once with locks ignored: any lock written between the
    /// two reads belongs to a transaction whose commit timestamp exceeds
    /// `start_ts`, so its data is invisible to this snapshot anyway.
    pub fn get(&self, table: &[u8], get: &Get) -> Result<RowResult, TxnError> {
        ensure_has_columns("get", get.has_columns())?;
        let result = self
            .shared
            .store
            .snapshot_get(table, get, self.start_ts, false)?;
        if result.is_lock_result() {
            return self.clean_locks_and_get_again(table, get, result.lock_cells());
        }
        Ok(result)
    }

    /// Opens a snapshot scanner over the given range.
    pub fn get_scanner(&self, table: &[u8], scan: &Scan) -> Result<Scanner<'_>, TxnError> {
        ensure_has_columns("scan", scan.has_columns())?;
        let inner = self.shared.store.scan(table, scan, self.start_ts)?;
        Ok(Scanner::new(self, table.to_vec(), scan.clone(), inner))
    }

    pub(crate) fn clean_locks_and_get_again(
        &self,
        table: &[u8],
        get: &Get,
        lock_cells: Vec<KeyValue>,
    ) -> Result<RowResult, TxnError> {
        self.shared.cleaner.clean_locks(table, &lock_cells)?;
        debug!(
            table = %String::from_utf8_lossy(table),
            start_ts = self.start_ts,
            cleaned = lock_cells.len(),
            "re-reading with locks ignored after clean"
        );
        let retried = self
            .shared
            .store
            .snapshot_get(table, get, self.start_ts, true)?;
        if retried.is_lock_result() {
            // the ignore-lock read must never report locks
            return Err(TxnError::Fatal(format!(
                "conflict locks survived an ignore-lock read, lock cells={}",
                retried.lock_cells().len()
            )));
        }
        Ok(retried)
    }

    /// Commits every buffered mutation atomically.
    ///
    /// An empty transaction commits trivially with no RPCs. On
    /// [`TxnError::LockConflict`] the transaction has been rolled back and
    /// may be retried from scratch. Any other error from the primary commit
    /// step must be treated as ambiguous: the transaction may have committed.
    pub fn commit(self) -> Result<(), TxnError> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let wall_time = self.shared.wall_clock.wall_time();
        let client_address = self.shared.registry.client_address();
        let plan = CommitPlan::build(
            &self.buffer,
            self.preferred_primary.as_ref(),
            self.start_ts,
            wall_time,
            &client_address,
        )?;

        self.prewrite_primary(&plan)?;
        self.prewrite_secondaries(&plan)?;
        // fetched only after every prewrite succeeded; an earlier commit_ts
        // could order this transaction before a lock it should have observed
        let commit_ts = self.shared.oracle.commit_ts()?;
        self.commit_primary(&plan, commit_ts)?;
        self.commit_secondaries(&plan, commit_ts);
        Ok(())
    }

    fn prewrite_primary(&self, plan: &CommitPlan) -> Result<(), TxnError> {
        self.prewrite_row_with_lock_clean(plan, &plan.primary_table, &plan.primary_row, true)
    }

    fn prewrite_secondaries(&self, plan: &CommitPlan) -> Result<(), TxnError> {
        for (index, (table, row_mutation)) in plan.secondary_rows.iter().enumerate() {
            if let Err(e) = self.prewrite_row_with_lock_clean(plan, table, row_mutation, false) {
                self.rollback_row_best_effort(&plan.primary_table, &plan.primary_row);
                self.rollback_secondary_rows(plan, index);
                return Err(e);
            }
        }
        Ok(())
    }

    /// Prewrites one row, resolving at most one conflicting lock.
    fn prewrite_row_with_lock_clean(
        &self,
        plan: &CommitPlan,
        table: &[u8],
        row_mutation: &RowMutation,
        contains_primary: bool,
    ) -> Result<(), TxnError> {
        let Some(conflict) = self.prewrite_row(plan, table, row_mutation, contains_primary)? else {
            return Ok(());
        };
        // the only legitimate conflict surface is a data column; anything
        // else means the server is misbehaving
        if !conflict.column().column().is_data_column() {
            return Err(TxnError::Fatal(format!(
                "prewrite returned a non-data conflict column: {conflict}"
            )));
        }
        self.shared.cleaner.clean_lock(&conflict)?;
        match self.prewrite_row(plan, table, row_mutation, contains_primary)? {
            None => Ok(()),
            Some(conflict) => Err(TxnError::LockConflict {
                lock: Box::new(conflict),
            }),
        }
    }

    fn prewrite_row(
        &self,
        plan: &CommitPlan,
        table: &[u8],
        row_mutation: &RowMutation,
        contains_primary: bool,
    ) -> Result<Option<TxnLock>, TxnError> {
        let conflict = if contains_primary {
            self.shared.store.prewrite_row(
                table,
                row_mutation.row(),
                row_mutation.mutations(),
                self.start_ts,
                &plan.primary_lock_bytes,
                plan.secondary_lock_bytes.as_deref(),
                plan.primary_index_in_row,
            )?
        } else {
            self.shared.store.prewrite_secondary_row(
                table,
                row_mutation.row(),
                row_mutation.mutations(),
                self.start_ts,
                plan.secondary_lock_bytes.as_deref(),
            )?
        };
        Ok(conflict)
    }

    fn commit_primary(&self, plan: &CommitPlan, commit_ts: u64) -> Result<(), TxnError> {
        match self.shared.store.commit_row(
            &plan.primary_table,
            plan.primary_row.row(),
            &plan.primary_row.without_values(),
            self.start_ts,
            commit_ts,
            plan.primary_index_in_row,
        ) {
            Ok(()) => Ok(()),
            Err(StoreError::LockCleaned) => {
                // a cleaner that erased the primary lock has committed to
                // rolling this transaction back; finish the job
                warn!(
                    primary = %plan.primary,
                    prewrite_ts = self.start_ts,
                    "primary lock erased by a peer cleaner, rolling back"
                );
                self.rollback_row_best_effort(&plan.primary_table, &plan.primary_row);
                self.rollback_secondary_rows(plan, plan.secondary_rows.len());
                Err(TxnError::LockCleaned {
                    primary: plan.primary.clone(),
                    prewrite_ts: self.start_ts,
                })
            }
            // the server may have committed before the failure surfaced;
            // rolling back could erase a committed transaction, so leave the
            // locks for the next reader's cleaner to resolve
            Err(e) => Err(e.into()),
        }
    }

    fn commit_secondaries(&self, plan: &CommitPlan, commit_ts: u64) {
        for (table, row_mutation) in &plan.secondary_rows {
            let result = self.shared.store.commit_secondary_row(
                table,
                row_mutation.row(),
                &row_mutation.without_values(),
                self.start_ts,
                commit_ts,
            );
            if let Err(e) = result {
                // readers roll leftover secondaries forward via the committed
                // primary, so a failure here costs cleanup work, not
                // correctness
                warn!(
                    table = %String::from_utf8_lossy(table),
                    row = %String::from_utf8_lossy(row_mutation.row()),
                    prewrite_ts = self.start_ts,
                    error = %e,
                    "secondary commit failed, continuing with remaining rows"
                );
            }
        }
    }

    /// Rolls back prewritten secondary rows `prewritten_count-1 .. 0`, newest
    /// first.
    fn rollback_secondary_rows(&self, plan: &CommitPlan, prewritten_count: usize) {
        for (table, row_mutation) in plan.secondary_rows[..prewritten_count].iter().rev() {
            self.rollback_row_best_effort(table, row_mutation);
        }
    }

    fn rollback_row(&self, table: &[u8], row_mutation: &RowMutation) -> Result<(), TxnError> {
        self.shared.cleaner.erase_lock_and_data(
            table,
            row_mutation.row(),
            &row_mutation.columns(),
            self.start_ts,
        )?;
        self.shared.stats.record_rollback();
        Ok(())
    }

    fn rollback_row_best_effort(&self, table: &[u8], row_mutation: &RowMutation) {
        if let Err(e) = self.rollback_row(table, row_mutation) {
            warn!(
                table = %String::from_utf8_lossy(table),
                row = %String::from_utf8_lossy(row_mutation.row()),
                prewrite_ts = self.start_ts,
                error = %e,
                "rollback failed, leaving the row for peer cleaners"
            );
        }
    }
}

fn ensure_has_columns(what: &str, has_columns: bool) -> Result<(), TxnError> {
    if has_columns {
        Ok(())
    } else {
        Err(TxnError::InvalidRequest(format!(
            "{what} must reference at least one column"
        )))
    }
}
