// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;
use thiserror::Error;

/// Failures reading or writing the persisted variable store.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreError {
    #[error("State file I/O failed for '{path}': {message}")]
    Io { path: String, message: String },

    /// The state file exists but does not contain a readable store
    #[error("State file '{path}' is corrupt: {message}")]
    Corrupt { path: String, message: String },

    #[error("State file '{path}' has unsupported version {version}")]
    UnsupportedVersion { path: String, version: u32 },

    #[error("Failed to serialize variable store: {message}")]
    Serialization { message: String },
}
