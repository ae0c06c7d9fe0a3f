// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Wall clock source.
//!
//! Wall times are embedded into transaction locks so that remote cleaners can
//! judge whether a lock's owner is plausibly still alive. They are never used
//! for ordering; the timestamp oracle owns ordering.

use std::time::{SystemTime, UNIX_EPOCH};

/// Source of wall-clock time in milliseconds since the Unix epoch.
pub trait WallClock: Send + Sync {
    /// Returns the current wall time.
    fn wall_time(&self) -> u64;
}

/// Wall clock backed by the system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemWallClock;

impl WallClock for SystemWallClock {
    fn wall_time(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_millis() as u64)
    }
}
