// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Worker registry trait.

use super::error::TxnError;

/// Registry of live transaction workers.
///
/// Each client registers once and obtains a stable address that is embedded
/// into every lock it writes. Remote cleaners use the address, together with
/// the lock's wall time, to decide whether a lock's owner is plausibly still
/// alive before rolling it back.
pub trait WorkerRegistry: Send + Sync {
    /// Registers this worker. Idempotent.
    fn register_worker(&self) -> Result<(), TxnError>;

    /// Returns this worker's stable client address.
    fn client_address(&self) -> Vec<u8>;
}

/// Registry with a fixed address and no liveness tracking, for single-process
/// deployments and tests.
#[derive(Debug, Clone)]
pub struct StaticWorkerRegistry {
    address: Vec<u8>,
}

impl StaticWorkerRegistry {
    /// Creates a registry with the given address.
    pub fn new(address: impl Into<Vec<u8>>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

impl Default for StaticWorkerRegistry {
    fn default() -> Self {
        Self::new(format!("worker-{}", std::process::id()))
    }
}

impl WorkerRegistry for StaticWorkerRegistry {
    fn register_worker(&self) -> Result<(), TxnError> {
        Ok(())
    }

    fn client_address(&self) -> Vec<u8> {
        self.address.clone()
    }
}
