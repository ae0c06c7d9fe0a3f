// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Transaction lock payloads and their wire codec.
//!
//! Every prewritten column carries a serialized lock. The lock on the primary
//! column enumerates all secondary columns of the transaction, so a cleaner
//! holding only the primary can find every other lock. Each secondary lock
//! points back at the primary, whose LOCK->WRITE transition is the ground
//! truth for the transaction's fate.
//!
//! Wire format (big-endian, length-prefixed):
//!
//! ```text
//! [kind:u8] [primary_flag:u8] [prewrite_ts:u64] [wall_time:u64]
//! [addr_len:u32][addr]
//! primary:   [count:u32] ([coordinate][kind:u8])*
//! secondary: [coordinate of primary]
//! coordinate = [table_len:u32][table][row_len:u32][row]
//!              [family_len:u32][family][qualifier_len:u32][qualifier]
//! ```
//!
//! The secondary payload is shared by every secondary column of a
//! transaction and is serialized once **without** the leading kind byte; the
//! server prepends each column's own kind at prewrite time.

use std::fmt;

use crate::store::{Column, ColumnCoordinate, MutationKind};

use super::error::TxnError;

const PRIMARY_FLAG: u8 = 1;
const SECONDARY_FLAG: u8 = 0;

/// Lock payload for the primary column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryLock {
    /// Mutation kind of the primary column itself.
    pub kind: MutationKind,
    pub prewrite_ts: u64,
    pub wall_time: u64,
    pub client_address: Vec<u8>,
    /// Every non-primary (column, kind) of the transaction, in selection
    /// order. A cleaner resolves the whole transaction from this list.
    pub secondaries: Vec<(ColumnCoordinate, MutationKind)>,
}

impl PrimaryLock {
    /// Serializes with the leading kind byte.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(64);
        buf.push(self.kind.code());
        buf.push(PRIMARY_FLAG);
        buf.extend_from_slice(&self.prewrite_ts.to_be_bytes());
        buf.extend_from_slice(&self.wall_time.to_be_bytes());
        put_slice(&mut buf, &self.client_address);
        buf.extend_from_slice(&(self.secondaries.len() as u32).to_be_bytes());
        for (coordinate, kind) in &self.secondaries {
            put_coordinate(&mut buf, coordinate);
            buf.push(kind.code());
        }
        buf
    }
}

/// Lock payload for a secondary column, referencing the primary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecondaryLock {
    pub kind: MutationKind,
    pub prewrite_ts: u64,
    pub wall_time: u64,
    pub client_address: Vec<u8>,
    pub primary: ColumnCoordinate,
}

impl SecondaryLock {
    /// Serializes with the leading kind byte.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = vec![self.kind.code()];
        buf.extend_from_slice(&self.to_bytes_without_kind());
        buf
    }

    /// Serializes without the leading kind byte. This is the payload shared
    /// by all secondary prewrites of a transaction; the server prepends the
    /// per-column kind.
    pub fn to_bytes_without_kind(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(64);
        buf.push(SECONDARY_FLAG);
        buf.extend_from_slice(&self.prewrite_ts.to_be_bytes());
        buf.extend_from_slice(&self.wall_time.to_be_bytes());
        put_slice(&mut buf, &self.client_address);
        put_coordinate(&mut buf, &self.primary);
        buf
    }
}

/// A primary or secondary lock payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockPayload {
    Primary(PrimaryLock),
    Secondary(SecondaryLock),
}

/// A lock observed at (or constructed for) a specific column.
///
/// The column itself is not part of the wire payload; it is known from the
/// cell the lock was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxnLock {
    pub column: ColumnCoordinate,
    pub payload: LockPayload,
}

impl TxnLock {
    /// Wraps a payload observed at `column`.
    pub fn new(column: ColumnCoordinate, payload: LockPayload) -> Self {
        Self { column, payload }
    }

    /// Decodes a kind-prefixed lock read from `column`'s lock cell.
    pub fn from_bytes(column: ColumnCoordinate, bytes: &[u8]) -> Result<Self, TxnError> {
        let mut reader = Reader::new(bytes);
        let kind_code = reader.take_u8()?;
        let kind = MutationKind::from_code(kind_code).ok_or_else(|| {
            TxnError::InvalidLockEncoding(format!("unknown mutation kind code {kind_code}"))
        })?;
        let flag = reader.take_u8()?;
        let prewrite_ts = reader.take_u64()?;
        let wall_time = reader.take_u64()?;
        let client_address = reader.take_slice()?.to_vec();

        let payload = match flag {
            PRIMARY_FLAG => {
                let count = reader.take_u32()? as usize;
                let mut secondaries = Vec::with_capacity(count);
                for _ in 0..count {
                    let coordinate = take_coordinate(&mut reader)?;
                    let code = reader.take_u8()?;
                    let secondary_kind = MutationKind::from_code(code).ok_or_else(|| {
                        TxnError::InvalidLockEncoding(format!(
                            "unknown secondary kind code {code}"
                        ))
                    })?;
                    secondaries.push((coordinate, secondary_kind));
                }
                LockPayload::Primary(PrimaryLock {
                    kind,
                    prewrite_ts,
                    wall_time,
                    client_address,
                    secondaries,
                })
            }
            SECONDARY_FLAG => LockPayload::Secondary(SecondaryLock {
                kind,
                prewrite_ts,
                wall_time,
                client_address,
                primary: take_coordinate(&mut reader)?,
            }),
            other => {
                return Err(TxnError::InvalidLockEncoding(format!(
                    "unknown lock flag {other}"
                )))
            }
        };
        reader.finish()?;
        Ok(Self { column, payload })
    }

    /// Serializes the payload with its kind byte.
    pub fn to_bytes(&self) -> Vec<u8> {
        match &self.payload {
            LockPayload::Primary(lock) => lock.to_bytes(),
            LockPayload::Secondary(lock) => lock.to_bytes(),
        }
    }

    /// Returns the column this lock was observed at.
    #[inline]
    pub fn column(&self) -> &ColumnCoordinate {
        &self.column
    }

    /// Returns true for a primary lock.
    #[inline]
    pub fn is_primary(&self) -> bool {
        matches!(self.payload, LockPayload::Primary(_))
    }

    /// Returns the mutation kind of the locked column.
    pub fn kind(&self) -> MutationKind {
        match &self.payload {
            LockPayload::Primary(lock) => lock.kind,
            LockPayload::Secondary(lock) => lock.kind,
        }
    }

    /// Returns the owning transaction's start timestamp.
    pub fn prewrite_ts(&self) -> u64 {
        match &self.payload {
            LockPayload::Primary(lock) => lock.prewrite_ts,
            LockPayload::Secondary(lock) => lock.prewrite_ts,
        }
    }

    /// Returns the wall time stamped when the lock was written.
    pub fn wall_time(&self) -> u64 {
        match &self.payload {
            LockPayload::Primary(lock) => lock.wall_time,
            LockPayload::Secondary(lock) => lock.wall_time,
        }
    }

    /// Returns the owning worker's client address.
    pub fn client_address(&self) -> &[u8] {
        match &self.payload {
            LockPayload::Primary(lock) => &lock.client_address,
            LockPayload::Secondary(lock) => &lock.client_address,
        }
    }
}

impl fmt::Display for TxnLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let role = if self.is_primary() { "primary" } else { "secondary" };
        write!(
            f,
            "{role} lock on {} (prewrite_ts={}, owner={})",
            self.column,
            self.prewrite_ts(),
            String::from_utf8_lossy(self.client_address())
        )
    }
}

fn put_slice(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    buf.extend_from_slice(bytes);
}

fn put_coordinate(buf: &mut Vec<u8>, coordinate: &ColumnCoordinate) {
    put_slice(buf, coordinate.table());
    put_slice(buf, coordinate.row());
    put_slice(buf, coordinate.column().family());
    put_slice(buf, coordinate.column().qualifier());
}

fn take_coordinate(reader: &mut Reader<'_>) -> Result<ColumnCoordinate, TxnError> {
    let table = reader.take_slice()?.to_vec();
    let row = reader.take_slice()?.to_vec();
    let family = reader.take_slice()?.to_vec();
    let qualifier = reader.take_slice()?.to_vec();
    Ok(ColumnCoordinate::new(table, row, Column::new(family, qualifier)))
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], TxnError> {
        let end = self.pos.checked_add(n).filter(|&end| end <= self.buf.len());
        let Some(end) = end else {
            return Err(TxnError::InvalidLockEncoding(format!(
                "truncated lock: need {} bytes at offset {}, have {}",
                n,
                self.pos,
                self.buf.len()
            )));
        };
        let bytes = &self.buf[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn take_u8(&mut self) -> Result<u8, TxnError> {
        Ok(self.take(1)?[0])
    }

    fn take_u32(&mut self) -> Result<u32, TxnError> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn take_u64(&mut self) -> Result<u64, TxnError> {
        let bytes = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(u64::from_be_bytes(raw))
    }

    fn take_slice(&mut self) -> Result<&'a [u8], TxnError> {
        let len = self.take_u32()? as usize;
        self.take(len)
    }

    fn finish(&self) -> Result<(), TxnError> {
        if self.pos != self.buf.len() {
            return Err(TxnError::InvalidLockEncoding(format!(
                "{} trailing bytes after lock",
                self.buf.len() - self.pos
            )));
        }
        Ok(())
    }
}
