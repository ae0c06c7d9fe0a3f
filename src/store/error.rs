// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Backing-store error types.

/// Errors surfaced by the backing-store coprocessor client.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("remote error: {0}")]
    Remote(String),

    /// The primary lock was missing when a primary commit was attempted.
    ///
    /// A peer cleaner that erases a primary lock has committed to rolling the
    /// transaction back, so the caller must treat this as a terminal abort.
    #[error("primary lock missing at commit, cleaned by a peer")]
    LockCleaned,

    #[error("invalid lock qualifier: {0}")]
    InvalidLockQualifier(String),
}
