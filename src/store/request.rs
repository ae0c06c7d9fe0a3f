// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! User-facing read and write requests.
//!
//! Requests are plain builders over (row, columns). Every request must name
//! at least one column; the transaction layer rejects empty requests before
//! touching the store.

use super::{Column, KeyValue, MutationKind};

/// A single-row snapshot read request.
#[derive(Debug, Clone)]
pub struct Get {
    row: Vec<u8>,
    columns: Vec<Column>,
}

impl Get {
    /// Creates a read for the given row.
    pub fn new(row: impl Into<Vec<u8>>) -> Self {
        Self {
            row: row.into(),
            columns: Vec::new(),
        }
    }

    /// Adds a column to read.
    #[must_use]
    pub fn add_column(mut self, family: impl Into<Vec<u8>>, qualifier: impl Into<Vec<u8>>) -> Self {
        self.columns.push(Column::new(family, qualifier));
        self
    }

    /// Reconstructs the single-row read a scan would have performed, used to
    /// re-read a row after cleaning its conflict locks.
    pub fn from_scan(scan: &Scan, row: impl Into<Vec<u8>>) -> Self {
        Self {
            row: row.into(),
            columns: scan.columns().to_vec(),
        }
    }

    /// Returns the row key.
    #[inline]
    pub fn row(&self) -> &[u8] {
        &self.row
    }

    /// Returns the requested columns.
    #[inline]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns true if at least one column is requested.
    #[inline]
    pub fn has_columns(&self) -> bool {
        !self.columns.is_empty()
    }
}

/// A single-row write request.
#[derive(Debug, Clone)]
pub struct Put {
    row: Vec<u8>,
    cells: Vec<(Column, Vec<u8>)>,
}

impl Put {
    /// Creates a write for the given row.
    pub fn new(row: impl Into<Vec<u8>>) -> Self {
        Self {
            row: row.into(),
            cells: Vec::new(),
        }
    }

    /// Adds a column value.
    #[must_use]
    pub fn add_column(
        mut self,
        family: impl Into<Vec<u8>>,
        qualifier: impl Into<Vec<u8>>,
        value: impl Into<Vec<u8>>,
    ) -> Self {
        self.cells.push((Column::new(family, qualifier), value.into()));
        self
    }

    /// Returns the row key.
    #[inline]
    pub fn row(&self) -> &[u8] {
        &self.row
    }

    /// Returns true if at least one column is written.
    #[inline]
    pub fn has_columns(&self) -> bool {
        !self.cells.is_empty()
    }

    /// Expands this request into buffer-ready cells.
    pub fn key_values(&self) -> Vec<KeyValue> {
        self.cells
            .iter()
            .map(|(column, value)| {
                KeyValue::new(
                    self.row.clone(),
                    column.family(),
                    column.qualifier(),
                    0,
                    MutationKind::Put,
                    value.clone(),
                )
            })
            .collect()
    }
}

/// A single-row delete request. Deletes remove every version of each named
/// column.
#[derive(Debug, Clone)]
pub struct Delete {
    row: Vec<u8>,
    columns: Vec<Column>,
}

impl Delete {
    /// Creates a delete for the given row.
    pub fn new(row: impl Into<Vec<u8>>) -> Self {
        Self {
            row: row.into(),
            columns: Vec::new(),
        }
    }

    /// Adds a column to delete.
    #[must_use]
    pub fn add_column(mut self, family: impl Into<Vec<u8>>, qualifier: impl Into<Vec<u8>>) -> Self {
        self.columns.push(Column::new(family, qualifier));
        self
    }

    /// Returns the row key.
    #[inline]
    pub fn row(&self) -> &[u8] {
        &self.row
    }

    /// Returns true if at least one column is deleted.
    #[inline]
    pub fn has_columns(&self) -> bool {
        !self.columns.is_empty()
    }

    /// Expands this request into buffer-ready cells.
    pub fn key_values(&self) -> Vec<KeyValue> {
        self.columns
            .iter()
            .map(|column| {
                KeyValue::new(
                    self.row.clone(),
                    column.family(),
                    column.qualifier(),
                    0,
                    MutationKind::DeleteColumn,
                    Vec::new(),
                )
            })
            .collect()
    }
}

/// A multi-row snapshot scan over `[start_row, stop_row)`.
///
/// An empty `stop_row` scans to the end of the table.
#[derive(Debug, Clone)]
pub struct Scan {
    start_row: Vec<u8>,
    stop_row: Vec<u8>,
    columns: Vec<Column>,
}

impl Scan {
    /// Creates a scan over the given row range.
    pub fn new(start_row: impl Into<Vec<u8>>, stop_row: impl Into<Vec<u8>>) -> Self {
        Self {
            start_row: start_row.into(),
            stop_row: stop_row.into(),
            columns: Vec::new(),
        }
    }

    /// Adds a column to scan.
    #[must_use]
    pub fn add_column(mut self, family: impl Into<Vec<u8>>, qualifier: impl Into<Vec<u8>>) -> Self {
        self.columns.push(Column::new(family, qualifier));
        self
    }

    /// Returns the inclusive start row.
    #[inline]
    pub fn start_row(&self) -> &[u8] {
        &self.start_row
    }

    /// Returns the exclusive stop row; empty means unbounded.
    #[inline]
    pub fn stop_row(&self) -> &[u8] {
        &self.stop_row
    }

    /// Returns the requested columns.
    #[inline]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns true if at least one column is requested.
    #[inline]
    pub fn has_columns(&self) -> bool {
        !self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_builder() {
        let get = Get::new("r").add_column("cf", "a").add_column("cf", "b");
        assert_eq!(get.row(), b"r");
        assert_eq!(get.columns().len(), 2);
        assert!(get.has_columns());
        assert!(!Get::new("r").has_columns());
    }

    #[test]
    fn test_put_key_values() {
        let put = Put::new("r").add_column("cf", "q", "v");
        let kvs = put.key_values();
        assert_eq!(kvs.len(), 1);
        assert_eq!(kvs[0].kind, MutationKind::Put);
        assert_eq!(kvs[0].value, b"v");
        assert_eq!(kvs[0].row, b"r");
    }

    #[test]
    fn test_delete_key_values_carry_no_value() {
        let delete = Delete::new("r").add_column("cf", "q");
        let kvs = delete.key_values();
        assert_eq!(kvs.len(), 1);
        assert_eq!(kvs[0].kind, MutationKind::DeleteColumn);
        assert!(kvs[0].value.is_empty());
    }

    #[test]
    fn test_get_from_scan() {
        let scan = Scan::new("a", "z").add_column("cf", "q");
        let get = Get::from_scan(&scan, "m");
        assert_eq!(get.row(), b"m");
        assert_eq!(get.columns(), scan.columns());
    }
}
