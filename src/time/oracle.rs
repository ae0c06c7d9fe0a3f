// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Timestamp oracle trait and a process-local implementation.

use std::sync::atomic::{AtomicU64, Ordering};

use super::TimeError;

/// Globally monotonic timestamp allocator.
///
/// Every timestamp drawn from the oracle is strictly greater than every
/// timestamp drawn before it, across all clients. A transaction's commit
/// timestamp is therefore guaranteed to exceed its start timestamp because
/// it is allocated later.
///
/// Oracle calls may block on network I/O; implementations must be safe for
/// concurrent use.
pub trait TimestampOracle: Send + Sync {
    /// Allocates a transaction start timestamp.
    fn start_ts(&self) -> Result<u64, TimeError>;

    /// Allocates a commit timestamp.
    fn commit_ts(&self) -> Result<u64, TimeError>;
}

/// Process-local oracle backed by a single atomic counter.
///
/// Monotonic within one process only; a shared oracle service replaces this
/// in a multi-node deployment.
pub struct LocalTimestampOracle {
    next: AtomicU64,
}

impl LocalTimestampOracle {
    /// Creates an oracle starting at timestamp 1.
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Creates an oracle whose first timestamp is `first`.
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    fn allocate(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for LocalTimestampOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl TimestampOracle for LocalTimestampOracle {
    fn start_ts(&self) -> Result<u64, TimeError> {
        Ok(self.allocate())
    }

    fn commit_ts(&self) -> Result<u64, TimeError> {
        Ok(self.allocate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strictly_increasing() {
        let oracle = LocalTimestampOracle::new();
        let a = oracle.start_ts().unwrap();
        let b = oracle.start_ts().unwrap();
        let c = oracle.commit_ts().unwrap();
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_starting_at() {
        let oracle = LocalTimestampOracle::starting_at(100);
        assert_eq!(oracle.start_ts().unwrap(), 100);
        assert_eq!(oracle.commit_ts().unwrap(), 101);
    }
}
