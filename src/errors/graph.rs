// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while building or querying the dependency graph.
///
/// Every variant except `UnknownUnit` is fatal to a build: no plan can be
/// computed until the offending declarations are fixed.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GraphError {
    /// A circular dependency was detected between units
    #[error("Cyclic dependency detected: {}", .cycle.join(" -> "))]
    CycleDetected {
        /// The closed cycle path, first and last entries are the same unit
        cycle: Vec<String>,
    },

    /// More than one unit claims to produce the same variable
    #[error("Variable '{variable}' is produced by more than one unit: {}", .units.join(", "))]
    AmbiguousProducer { variable: String, units: Vec<String> },

    /// Two descriptors share the same unit name
    #[error("Duplicate unit name: '{unit}'")]
    DuplicateUnit { unit: String },

    /// A query referenced a unit that is not part of the graph
    #[error("Unknown unit: '{unit}'")]
    UnknownUnit { unit: String },
}
