// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Transaction error types.

use crate::store::{ColumnCoordinate, StoreError};
use crate::time::TimeError;

use super::lock::TxnLock;

/// Errors that can occur in transaction operations.
#[derive(Debug, thiserror::Error)]
pub enum TxnError {
    /// A user-supplied get/put/delete/scan names no columns.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Commit was attempted with no selectable primary column.
    #[error("invalid transaction state: {0}")]
    InvalidState(String),

    /// A conflicting lock survived one cleaning attempt. The whole
    /// transaction may be retried by the caller.
    #[error("unresolved lock conflict on {}", .lock.column())]
    LockConflict { lock: Box<TxnLock> },

    /// This transaction's primary lock was erased by a peer cleaner, which
    /// committed the peer to rolling this transaction back. Terminal.
    #[error("primary lock on {primary} erased by a peer cleaner, prewrite_ts={prewrite_ts}")]
    LockCleaned {
        primary: ColumnCoordinate,
        prewrite_ts: u64,
    },

    /// An invariant was violated by the server or a collaborator.
    /// Non-recoverable.
    #[error("protocol violation: {0}")]
    Fatal(String),

    #[error("invalid lock encoding: {0}")]
    InvalidLockEncoding(String),

    #[error("time error: {0}")]
    Time(#[from] TimeError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
