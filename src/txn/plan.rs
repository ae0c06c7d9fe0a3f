// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Commit planning: primary selection and lock payload construction.
//!
//! The plan is built once per commit from the frozen mutation buffer. The
//! first buffered column in enumeration order becomes the primary unless the
//! caller pinned one; every other column is a secondary, and every row not
//! containing the primary becomes a secondary row. The serialized secondary
//! lock payload is computed here exactly once and shared by all secondary
//! prewrites.

use crate::store::{ColumnCoordinate, MutationKind};

use super::buffer::{MutationBuffer, RowMutation};
use super::error::TxnError;
use super::lock::{PrimaryLock, SecondaryLock};

/// The frozen shape of one commit attempt.
#[derive(Debug)]
pub(crate) struct CommitPlan {
    pub(crate) primary: ColumnCoordinate,
    /// Index of the primary column within its row's mutation list.
    pub(crate) primary_index_in_row: usize,
    pub(crate) primary_table: Vec<u8>,
    pub(crate) primary_row: RowMutation,
    /// Every non-primary column, in selection order.
    pub(crate) secondaries: Vec<(ColumnCoordinate, MutationKind)>,
    /// Rows not containing the primary, in enumeration order.
    pub(crate) secondary_rows: Vec<(Vec<u8>, RowMutation)>,
    pub(crate) primary_lock_bytes: Vec<u8>,
    /// Shared secondary lock payload, serialized without the kind byte.
    /// `None` for single-column transactions, which need no secondary lock.
    pub(crate) secondary_lock_bytes: Option<Vec<u8>>,
}

impl CommitPlan {
    pub(crate) fn build(
        buffer: &MutationBuffer,
        preferred: Option<&ColumnCoordinate>,
        prewrite_ts: u64,
        wall_time: u64,
        client_address: &[u8],
    ) -> Result<Self, TxnError> {
        let mut primary: Option<(ColumnCoordinate, usize, Vec<u8>, RowMutation)> = None;
        let mut secondaries: Vec<(ColumnCoordinate, MutationKind)> = Vec::new();
        let mut secondary_rows: Vec<(Vec<u8>, RowMutation)> = Vec::new();

        for (table, row_mutation) in buffer.iter() {
            let mut primary_in_row = false;
            for (index, mutation) in row_mutation.mutations().iter().enumerate() {
                let coordinate = ColumnCoordinate::new(
                    table,
                    row_mutation.row(),
                    mutation.column().clone(),
                );
                if primary.is_none() && preferred.is_none_or(|p| p == &coordinate) {
                    primary = Some((coordinate, index, table.to_vec(), row_mutation.clone()));
                    primary_in_row = true;
                } else {
                    secondaries.push((coordinate, mutation.kind()));
                }
            }
            if !primary_in_row {
                secondary_rows.push((table.to_vec(), row_mutation.clone()));
            }
        }

        let Some((primary, primary_index_in_row, primary_table, primary_row)) = primary else {
            return Err(TxnError::InvalidState(
                "can not find primary column".to_string(),
            ));
        };

        let primary_kind = primary_row.kind_of(primary.column()).ok_or_else(|| {
            TxnError::InvalidState("primary column missing from its row".to_string())
        })?;
        let primary_lock_bytes = PrimaryLock {
            kind: primary_kind,
            prewrite_ts,
            wall_time,
            client_address: client_address.to_vec(),
            secondaries: secondaries.clone(),
        }
        .to_bytes();

        let single_column = primary_row.len() <= 1 && secondary_rows.is_empty();
        let secondary_lock_bytes = (!single_column).then(|| {
            SecondaryLock {
                kind: MutationKind::Put,
                prewrite_ts,
                wall_time,
                client_address: client_address.to_vec(),
                primary: primary.clone(),
            }
            .to_bytes_without_kind()
        });

        Ok(Self {
            primary,
            primary_index_in_row,
            primary_table,
            primary_row,
            secondaries,
            secondary_rows,
            primary_lock_bytes,
            secondary_lock_bytes,
        })
    }
}
