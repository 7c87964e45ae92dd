// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;
use thiserror::Error;

/// Errors raised while loading or validating an engine configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("Failed to read config '{path}': {message}")]
    Read { path: String, message: String },

    /// The configuration file is not valid YAML/TOML for the expected schema
    #[error("Failed to parse config '{path}': {message}")]
    Parse { path: String, message: String },

    /// The file extension does not map to a supported format
    #[error("Unsupported config format for '{path}' (expected .yaml, .yml or .toml)")]
    UnsupportedFormat { path: String },

    /// A field holds a value the engine cannot work with
    #[error("Invalid config field '{field}': {message}")]
    Invalid { field: String, message: String },
}
