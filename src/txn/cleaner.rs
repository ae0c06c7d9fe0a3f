// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Lock cleaner trait.

use crate::store::{Column, KeyValue};

use super::error::TxnError;
use super::lock::TxnLock;

/// Resolves locks left behind by other transactions.
///
/// Given a conflicting lock, the cleaner consults the referenced primary
/// lock's state as ground truth and either rolls the owning transaction
/// forward (the primary has committed) or back (it has not, and its worker is
/// expired). Cleaning policy (liveness judgment, backoff, retry budget) is
/// the implementation's concern; the coordinator only relies on the contract
/// below.
///
/// Implementations are shared across transactions and must be safe for
/// concurrent use.
pub trait LockCleaner: Send + Sync {
    /// Attempts to resolve every lock in `lock_cells`, as surfaced by a
    /// conflicting read. Returns an error if any lock could not be resolved.
    fn clean_locks(&self, table: &[u8], lock_cells: &[KeyValue]) -> Result<(), TxnError>;

    /// Attempts to resolve a single lock observed during prewrite.
    fn clean_lock(&self, lock: &TxnLock) -> Result<(), TxnError>;

    /// Erases the locks and staged data written at `prewrite_ts` for the
    /// given columns. Idempotent: erasing an already-erased row is a no-op.
    fn erase_lock_and_data(
        &self,
        table: &[u8],
        row: &[u8],
        columns: &[Column],
        prewrite_ts: u64,
    ) -> Result<(), TxnError>;
}
