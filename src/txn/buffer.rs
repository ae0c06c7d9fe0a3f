// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Per-transaction mutation buffer.
//!
//! Writes and deletes are buffered locally until commit, deduplicated by
//! (table, row, column) with last-writer-wins semantics. Column order within
//! a row follows first insertion, which also fixes the order in which the
//! commit planner enumerates candidates for the primary column.

use std::collections::BTreeMap;

use crate::store::{Column, ColumnCoordinate, ColumnMutation, KeyValue, MutationKind};

/// Ordered column mutations for a single (table, row).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowMutation {
    row: Vec<u8>,
    mutations: Vec<ColumnMutation>,
}

impl RowMutation {
    /// Creates an empty row mutation.
    pub fn new(row: impl Into<Vec<u8>>) -> Self {
        Self {
            row: row.into(),
            mutations: Vec::new(),
        }
    }

    /// Returns the row key.
    #[inline]
    pub fn row(&self) -> &[u8] {
        &self.row
    }

    /// Returns the number of buffered columns.
    #[inline]
    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    /// Returns true if no columns are buffered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    /// Returns the mutations in insertion order.
    #[inline]
    pub fn mutations(&self) -> &[ColumnMutation] {
        &self.mutations
    }

    /// Inserts or replaces the mutation for its column. A replacement keeps
    /// the column's original position.
    pub fn insert(&mut self, mutation: ColumnMutation) {
        if let Some(existing) = self
            .mutations
            .iter_mut()
            .find(|m| m.column() == mutation.column())
        {
            *existing = mutation;
        } else {
            self.mutations.push(mutation);
        }
    }

    /// Returns the kind buffered for a column, if any.
    pub fn kind_of(&self, column: &Column) -> Option<MutationKind> {
        self.mutations
            .iter()
            .find(|m| m.column() == column)
            .map(|m| m.kind())
    }

    /// Returns the buffered columns in order.
    pub fn columns(&self) -> Vec<Column> {
        self.mutations.iter().map(|m| m.column().clone()).collect()
    }

    /// Returns a value-stripped copy of the mutations for commit RPCs.
    pub fn without_values(&self) -> Vec<ColumnMutation> {
        self.mutations.iter().map(|m| m.without_value()).collect()
    }
}

/// Deduplicating buffer of pending mutations, grouped table -> row -> columns.
///
/// Keys are compared by byte-sequence equality and enumerated in byte order,
/// which makes planning deterministic.
#[derive(Debug, Default)]
pub struct MutationBuffer {
    tables: BTreeMap<Vec<u8>, BTreeMap<Vec<u8>, RowMutation>>,
}

impl MutationBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the mutation for (table, kv.row, kv.column).
    pub fn add(&mut self, table: &[u8], kv: KeyValue) {
        let row_mutation = self
            .tables
            .entry(table.to_vec())
            .or_default()
            .entry(kv.row.clone())
            .or_insert_with(|| RowMutation::new(kv.row.clone()));
        row_mutation.insert(ColumnMutation::from_key_value(&kv));
    }

    /// Returns the number of distinct (table, row, column) entries.
    pub fn size(&self) -> usize {
        self.tables
            .values()
            .flat_map(|rows| rows.values())
            .map(RowMutation::len)
            .sum()
    }

    /// Returns true if nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Iterates over (table, row mutation) pairs in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &RowMutation)> {
        self.tables.iter().flat_map(|(table, rows)| {
            rows.values().map(move |row| (table.as_slice(), row))
        })
    }

    /// Returns the kind buffered at a coordinate, if any.
    pub fn kind_of(&self, coordinate: &ColumnCoordinate) -> Option<MutationKind> {
        self.tables
            .get(coordinate.table())
            .and_then(|rows| rows.get(coordinate.row()))
            .and_then(|row| row.kind_of(coordinate.column()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put_kv(row: &str, qualifier: &str, value: &str) -> KeyValue {
        KeyValue::new(row, "cf", qualifier, 0, MutationKind::Put, value)
    }

    fn delete_kv(row: &str, qualifier: &str) -> KeyValue {
        KeyValue::new(row, "cf", qualifier, 0, MutationKind::DeleteColumn, "")
    }

    #[test]
    fn test_add_and_size() {
        let mut buffer = MutationBuffer::new();
        assert!(buffer.is_empty());

        buffer.add(b"t1", put_kv("r1", "a", "v1"));
        buffer.add(b"t1", put_kv("r1", "b", "v2"));
        buffer.add(b"t1", put_kv("r2", "a", "v3"));
        buffer.add(b"t2", put_kv("r1", "a", "v4"));
        assert_eq!(buffer.size(), 4);
    }

    #[test]
    fn test_last_writer_wins() {
        let mut buffer = MutationBuffer::new();
        buffer.add(b"t", put_kv("r", "q", "v1"));
        buffer.add(b"t", delete_kv("r", "q"));
        assert_eq!(buffer.size(), 1);

        let coordinate =
            ColumnCoordinate::new("t", "r", Column::new("cf", "q"));
        assert_eq!(buffer.kind_of(&coordinate), Some(MutationKind::DeleteColumn));

        // overwrite back to a put
        buffer.add(b"t", put_kv("r", "q", "v2"));
        assert_eq!(buffer.size(), 1);
        assert_eq!(buffer.kind_of(&coordinate), Some(MutationKind::Put));
    }

    #[test]
    fn test_column_order_is_first_insertion() {
        let mut buffer = MutationBuffer::new();
        buffer.add(b"t", put_kv("r", "b", "v1"));
        buffer.add(b"t", put_kv("r", "a", "v2"));
        buffer.add(b"t", put_kv("r", "b", "v3"));

        let (_, row) = buffer.iter().next().unwrap();
        let qualifiers: Vec<_> = row
            .mutations()
            .iter()
            .map(|m| m.column().qualifier().to_vec())
            .collect();
        assert_eq!(qualifiers, vec![b"b".to_vec(), b"a".to_vec()]);
        assert_eq!(row.mutations()[0].value(), Some(b"v3".as_slice()));
    }

    #[test]
    fn test_iteration_is_deterministic() {
        let mut buffer = MutationBuffer::new();
        buffer.add(b"t2", put_kv("r1", "a", "v"));
        buffer.add(b"t1", put_kv("r2", "a", "v"));
        buffer.add(b"t1", put_kv("r1", "a", "v"));

        let order: Vec<_> = buffer
            .iter()
            .map(|(table, row)| (table.to_vec(), row.row().to_vec()))
            .collect();
        assert_eq!(
            order,
            vec![
                (b"t1".to_vec(), b"r1".to_vec()),
                (b"t1".to_vec(), b"r2".to_vec()),
                (b"t2".to_vec(), b"r1".to_vec()),
            ]
        );
    }

    #[test]
    fn test_without_values() {
        let mut row = RowMutation::new("r");
        row.insert(ColumnMutation::from_key_value(&put_kv("r", "q", "v")));
        let stripped = row.without_values();
        assert_eq!(stripped.len(), 1);
        assert_eq!(stripped[0].value(), None);
        assert_eq!(stripped[0].kind(), MutationKind::Put);
    }

    #[test]
    fn test_kind_of_missing() {
        let buffer = MutationBuffer::new();
        let coordinate =
            ColumnCoordinate::new("t", "r", Column::new("cf", "q"));
        assert_eq!(buffer.kind_of(&coordinate), None);
    }
}
