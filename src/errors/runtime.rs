// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;
use thiserror::Error;

use super::{ConfigError, GraphError, MalformedMetadataError, StoreError};

/// Anything that can stop an engine from being assembled.
///
/// Serializes as the wrapped error, which already carries its own `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(untagged)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A unit declared in the config file is malformed
    #[error(transparent)]
    Metadata(#[from] MalformedMetadataError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
