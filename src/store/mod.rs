// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Backing-store surface: columns, cells, requests, and the coprocessor
//! client trait the transaction coordinator drives.
//!
//! The backing store is a distributed, row-atomic, multi-version key-value
//! store. Cross-row atomicity is built client-side on top of three shadow
//! column families per data column:
//!
//! - **DATA**: the staged value, written at the transaction's prewrite
//!   timestamp
//! - **LOCK**: intent state while a transaction is in flight
//! - **WRITE**: commit records mapping a commit timestamp back to the
//!   prewrite timestamp holding the value
//!
//! [`MemStore`] is an in-memory reference implementation of the contract,
//! used by tests and single-process deployments.

mod cell;
mod client;
mod column;
mod error;
mod mem;
mod request;

pub use cell::{ColumnMutation, KeyValue, MutationKind, RowResult};
pub use client::{CoprocessorClient, StoreScanner};
pub use column::{
    column_from_lock_qualifier, lock_qualifier, Column, ColumnCoordinate, LOCK_FAMILY,
    WRITE_FAMILY,
};
pub use error::StoreError;
pub use mem::MemStore;
pub use request::{Delete, Get, Put, Scan};
