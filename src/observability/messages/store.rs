// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for variable store persistence.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};

/// The store was opened.
///
/// # Log Level
/// `info!` - Important operational event
pub struct StoreOpened<'a> {
    pub path: Option<&'a str>,
    pub variable_count: usize,
}

impl Display for StoreOpened<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.path {
            Some(path) => write!(
                f,
                "Variable store opened from '{}' with {} variables",
                path, self.variable_count
            ),
            None => write!(f, "In-memory variable store created"),
        }
    }
}

impl StructuredLog for StoreOpened<'_> {
    fn log(&self) {
        tracing::info!(
            path = self.path.unwrap_or("<memory>"),
            variable_count = self.variable_count,
            "{}", self
        );
    }
}

/// A mutation batch was written through to disk.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
pub struct StorePersisted<'a> {
    pub path: &'a str,
    pub variable_count: usize,
    pub changed: usize,
}

impl Display for StorePersisted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Persisted {} variables to '{}' ({} changed)",
            self.variable_count, self.path, self.changed
        )
    }
}

impl StructuredLog for StorePersisted<'_> {
    fn log(&self) {
        tracing::debug!(
            path = self.path,
            variable_count = self.variable_count,
            changed = self.changed,
            "{}", self
        );
    }
}

/// The store was cleared.
///
/// # Log Level
/// `info!` - Important operational event
pub struct StoreCleared {
    pub removed: usize,
    pub generation: u64,
}

impl Display for StoreCleared {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Variable store cleared: {} variables removed (generation {})",
            self.removed, self.generation
        )
    }
}

impl StructuredLog for StoreCleared {
    fn log(&self) {
        tracing::info!(
            removed = self.removed,
            generation = self.generation,
            "{}", self
        );
    }
}
