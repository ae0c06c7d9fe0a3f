// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Timestamp allocation and wall-clock time.
//!
//! The transaction protocol needs two unrelated notions of time:
//!
//! - **Oracle timestamps** ([`TimestampOracle`]): globally monotonic logical
//!   timestamps defining snapshot visibility and the commit order. The oracle
//!   is an external service; [`LocalTimestampOracle`] covers single-process
//!   use and tests.
//! - **Wall time** ([`WallClock`]): coarse physical time embedded into locks
//!   so that peer cleaners can judge lock-owner liveness.

mod clock;
mod error;
mod oracle;

pub use clock::{SystemWallClock, WallClock};
pub use error::TimeError;
pub use oracle::{LocalTimestampOracle, TimestampOracle};
