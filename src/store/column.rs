// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Column identity and the shadow column families.
//!
//! The backing store keeps three column families per data column: the data
//! family itself (the user's family), plus LOCK and WRITE shadow families
//! that encode intent state and commit records. The coordinator only needs
//! family identity: a column is a data column iff its family is neither
//! shadow family.

use std::fmt;

use super::StoreError;

/// Family holding in-flight transaction locks.
pub const LOCK_FAMILY: &[u8] = b"#lock";

/// Family holding commit records pointing back at prewrite timestamps.
pub const WRITE_FAMILY: &[u8] = b"#write";

/// A (family, qualifier) pair naming a column within a row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Column {
    family: Vec<u8>,
    qualifier: Vec<u8>,
}

impl Column {
    /// Creates a column from family and qualifier bytes.
    pub fn new(family: impl Into<Vec<u8>>, qualifier: impl Into<Vec<u8>>) -> Self {
        Self {
            family: family.into(),
            qualifier: qualifier.into(),
        }
    }

    /// Returns the family bytes.
    #[inline]
    pub fn family(&self) -> &[u8] {
        &self.family
    }

    /// Returns the qualifier bytes.
    #[inline]
    pub fn qualifier(&self) -> &[u8] {
        &self.qualifier
    }

    /// Returns true if this column belongs to the LOCK shadow family.
    #[inline]
    pub fn is_lock_column(&self) -> bool {
        self.family == LOCK_FAMILY
    }

    /// Returns true if this column belongs to the WRITE shadow family.
    #[inline]
    pub fn is_write_column(&self) -> bool {
        self.family == WRITE_FAMILY
    }

    /// Returns true if this is a user data column.
    ///
    /// A conflict lock returned from prewrite is legitimate only when its
    /// column is a data column.
    #[inline]
    pub fn is_data_column(&self) -> bool {
        !self.is_lock_column() && !self.is_write_column()
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            String::from_utf8_lossy(&self.family),
            String::from_utf8_lossy(&self.qualifier)
        )
    }
}

/// Fully-qualified column address: (table, row, family, qualifier).
///
/// Identity is by value; coordinates are used as map keys and for equality
/// comparisons when selecting the primary column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnCoordinate {
    table: Vec<u8>,
    row: Vec<u8>,
    column: Column,
}

impl ColumnCoordinate {
    /// Creates a coordinate from its parts.
    pub fn new(table: impl Into<Vec<u8>>, row: impl Into<Vec<u8>>, column: Column) -> Self {
        Self {
            table: table.into(),
            row: row.into(),
            column,
        }
    }

    /// Returns the table name.
    #[inline]
    pub fn table(&self) -> &[u8] {
        &self.table
    }

    /// Returns the row key.
    #[inline]
    pub fn row(&self) -> &[u8] {
        &self.row
    }

    /// Returns the column.
    #[inline]
    pub fn column(&self) -> &Column {
        &self.column
    }
}

impl fmt::Display for ColumnCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            String::from_utf8_lossy(&self.table),
            String::from_utf8_lossy(&self.row),
            self.column
        )
    }
}

/// Encodes the qualifier under which a data column's lock cell is stored.
///
/// Format: `[family_len:u32 BE][family bytes][qualifier bytes]`. The family
/// length prefix makes the mapping reversible for arbitrary family bytes.
pub fn lock_qualifier(column: &Column) -> Vec<u8> {
    let family = column.family();
    let qualifier = column.qualifier();
    let mut encoded = Vec::with_capacity(4 + family.len() + qualifier.len());
    encoded.extend_from_slice(&(family.len() as u32).to_be_bytes());
    encoded.extend_from_slice(family);
    encoded.extend_from_slice(qualifier);
    encoded
}

/// Decodes a lock-cell qualifier back into the data column it shadows.
pub fn column_from_lock_qualifier(encoded: &[u8]) -> Result<Column, StoreError> {
    if encoded.len() < 4 {
        return Err(StoreError::InvalidLockQualifier(
            "qualifier too short for family length prefix".to_string(),
        ));
    }
    let family_len =
        u32::from_be_bytes([encoded[0], encoded[1], encoded[2], encoded[3]]) as usize;
    if encoded.len() < 4 + family_len {
        return Err(StoreError::InvalidLockQualifier(format!(
            "family length {} exceeds qualifier size {}",
            family_len,
            encoded.len()
        )));
    }
    let family = encoded[4..4 + family_len].to_vec();
    let qualifier = encoded[4 + family_len..].to_vec();
    Ok(Column::new(family, qualifier))
}
