// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Store cells and mutation kinds.

use super::Column;

/// The kind of a buffered or stored mutation.
///
/// Discriminants are the wire codes used in serialized locks; `Delete`
/// removes a single version, `DeleteColumn` removes every version of the
/// column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MutationKind {
    Put = 4,
    Delete = 8,
    DeleteColumn = 12,
}

impl MutationKind {
    /// Returns the wire code for this kind.
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Decodes a wire code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            4 => Some(Self::Put),
            8 => Some(Self::Delete),
            12 => Some(Self::DeleteColumn),
            _ => None,
        }
    }

    /// Returns true for the delete variants, which carry no value.
    #[inline]
    pub fn is_delete(self) -> bool {
        matches!(self, Self::Delete | Self::DeleteColumn)
    }
}

/// A single versioned cell: (row, family, qualifier, timestamp) plus kind and
/// value bytes. Cells are both what reads return and what mutations feed into
/// the transaction's buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub row: Vec<u8>,
    pub family: Vec<u8>,
    pub qualifier: Vec<u8>,
    pub timestamp: u64,
    pub kind: MutationKind,
    pub value: Vec<u8>,
}

impl KeyValue {
    /// Creates a cell.
    pub fn new(
        row: impl Into<Vec<u8>>,
        family: impl Into<Vec<u8>>,
        qualifier: impl Into<Vec<u8>>,
        timestamp: u64,
        kind: MutationKind,
        value: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            row: row.into(),
            family: family.into(),
            qualifier: qualifier.into(),
            timestamp,
            kind,
            value: value.into(),
        }
    }

    /// Returns the (family, qualifier) of this cell as a column.
    pub fn column(&self) -> Column {
        Column::new(self.family.clone(), self.qualifier.clone())
    }
}

/// A pending mutation for one column of one row.
///
/// The delete kinds carry no value. Prewrite RPCs ship the full mutation;
/// commit RPCs ship a value-stripped copy, since the committed value already
/// lives under DATA at the prewrite timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMutation {
    column: Column,
    kind: MutationKind,
    value: Option<Vec<u8>>,
}

impl ColumnMutation {
    /// Creates a mutation. Delete kinds discard any provided value.
    pub fn new(column: Column, kind: MutationKind, value: Option<Vec<u8>>) -> Self {
        Self {
            column,
            kind,
            value: if kind.is_delete() { None } else { value },
        }
    }

    /// Builds a mutation from a buffered cell.
    pub fn from_key_value(kv: &KeyValue) -> Self {
        Self::new(kv.column(), kv.kind, Some(kv.value.clone()))
    }

    /// Returns the column.
    #[inline]
    pub fn column(&self) -> &Column {
        &self.column
    }

    /// Returns the mutation kind.
    #[inline]
    pub fn kind(&self) -> MutationKind {
        self.kind
    }

    /// Returns the value, if this kind carries one.
    #[inline]
    pub fn value(&self) -> Option<&[u8]> {
        self.value.as_deref()
    }

    /// Returns a value-stripped copy for commit RPCs.
    pub fn without_value(&self) -> Self {
        Self {
            column: self.column.clone(),
            kind: self.kind,
            value: None,
        }
    }
}

/// Cells returned for one row by a snapshot-aware read.
///
/// When a read at `start_ts` observes conflicting locks, the client surfaces
/// the lock cells themselves; [`RowResult::is_lock_result`] is the sentinel
/// the coordinator checks before invoking the lock cleaner.
#[derive(Debug, Clone, Default)]
pub struct RowResult {
    cells: Vec<KeyValue>,
}

impl RowResult {
    /// Creates a result from cells.
    pub fn new(cells: Vec<KeyValue>) -> Self {
        Self { cells }
    }

    /// Creates an empty result.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the cells in this result.
    #[inline]
    pub fn cells(&self) -> &[KeyValue] {
        &self.cells
    }

    /// Returns true if the result carries no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the row key, if any cell is present.
    pub fn row(&self) -> Option<&[u8]> {
        self.cells.first().map(|kv| kv.row.as_slice())
    }

    /// Returns true if this result reports conflicting locks instead of data.
    pub fn is_lock_result(&self) -> bool {
        self.cells
            .first()
            .is_some_and(|kv| kv.column().is_lock_column())
    }

    /// Returns the cells that live in the LOCK shadow family.
    pub fn lock_cells(&self) -> Vec<KeyValue> {
        self.cells
            .iter()
            .filter(|kv| kv.column().is_lock_column())
            .cloned()
            .collect()
    }

    /// Returns the value of the first cell matching (family, qualifier).
    pub fn value(&self, family: &[u8], qualifier: &[u8]) -> Option<&[u8]> {
        self.cells
            .iter()
            .find(|kv| kv.family == family && kv.qualifier == qualifier)
            .map(|kv| kv.value.as_slice())
    }
}
