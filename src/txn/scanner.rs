// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Snapshot scanner with lock recovery.

use crate::store::{Get, RowResult, Scan, StoreScanner};

use super::error::TxnError;
use super::transaction::Transaction;

/// Streaming snapshot scan bound to a transaction.
///
/// Rows surface in range order. A row blocked by conflicting locks goes
/// through the same clean-then-reread recovery as a point read, so a scan
/// never returns lock cells to the caller.
pub struct Scanner<'a> {
    txn: &'a Transaction,
    table: Vec<u8>,
    scan: Scan,
    inner: Box<dyn StoreScanner>,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(
        txn: &'a Transaction,
        table: Vec<u8>,
        scan: Scan,
        inner: Box<dyn StoreScanner>,
    ) -> Self {
        Self {
            txn,
            table,
            scan,
            inner,
        }
    }

    /// Returns the next row, or `None` when the scan is exhausted.
    ///
    /// A row whose locks were cleaned may come back empty when no committed
    /// version is visible at the snapshot.
    pub fn next(&mut self) -> Result<Option<RowResult>, TxnError> {
        let Some(result) = self.inner.next()? else {
            return Ok(None);
        };
        if !result.is_lock_result() {
            return Ok(Some(result));
        }
        let row = result
            .row()
            .ok_or_else(|| TxnError::Fatal("lock result carries no cells".to_string()))?
            .to_vec();
        let get = Get::from_scan(&self.scan, row);
        self.txn
            .clean_locks_and_get_again(&self.table, &get, result.lock_cells())
            .map(Some)
    }
}
