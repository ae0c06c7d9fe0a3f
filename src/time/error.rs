// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Time error types.

/// Errors that can occur when allocating timestamps.
#[derive(Debug, thiserror::Error)]
pub enum TimeError {
    #[error("timestamp oracle unavailable: {0}")]
    Unavailable(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
