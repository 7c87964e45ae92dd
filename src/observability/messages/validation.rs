// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for metadata and dependency graph validation.
//!
//! This module contains message types for logging events related to:
//! * Malformed unit metadata found during a scan
//! * Cyclic dependency detection
//! * Ambiguous producers and duplicate unit names
//! * Successful graph builds

use crate::errors::MalformedMetadataError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Cyclic dependency detected while building the graph.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use scriptflow::observability::messages::validation::CyclicDependencyDetected;
///
/// let cycle = vec!["a".to_string(), "b".to_string(), "a".to_string()];
/// let msg = CyclicDependencyDetected { cycle: &cycle };
///
/// assert_eq!(msg.to_string(), "Cyclic dependency detected: a -> b -> a");
/// ```
pub struct CyclicDependencyDetected<'a> {
    pub cycle: &'a [String],
}

impl Display for CyclicDependencyDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Cyclic dependency detected: {}", self.cycle.join(" -> "))
    }
}

impl StructuredLog for CyclicDependencyDetected<'_> {
    fn log(&self) {
        tracing::error!(
            cycle = self.cycle.join(" -> "),
            cycle_length = self.cycle.len(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::ERROR,
            "cycle_detected",
            name = name,
            cycle = self.cycle.join(" -> "),
            cycle_length = self.cycle.len(),
        )
    }
}

/// More than one unit produces the same variable.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct AmbiguousProducerDetected<'a> {
    pub variable: &'a str,
    pub units: &'a [String],
}

impl Display for AmbiguousProducerDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Variable '{}' has multiple producers: {}",
            self.variable,
            self.units.join(", ")
        )
    }
}

impl StructuredLog for AmbiguousProducerDetected<'_> {
    fn log(&self) {
        tracing::error!(
            variable = self.variable,
            producers = self.units.join(", "),
            "{}", self
        );
    }
}

/// Two descriptors share a unit name.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct DuplicateUnitDetected<'a> {
    pub unit: &'a str,
}

impl Display for DuplicateUnitDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Duplicate unit name: '{}'", self.unit)
    }
}

impl StructuredLog for DuplicateUnitDetected<'_> {
    fn log(&self) {
        tracing::error!(unit = self.unit, "{}", self);
    }
}

/// A unit was left out of a scan because its markers are malformed.
///
/// # Log Level
/// `warn!` - Potential issue, the scan continues
pub struct MalformedUnitExcluded<'a> {
    pub error: &'a MalformedMetadataError,
}

impl Display for MalformedUnitExcluded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Excluding unit from registry: {}", self.error)
    }
}

impl StructuredLog for MalformedUnitExcluded<'_> {
    fn log(&self) {
        tracing::warn!(
            unit = %self.error.unit,
            line = ?self.error.line,
            issue = %self.error.issue,
            "{}", self
        );
    }
}

/// The dependency graph was built and validated.
///
/// # Log Level
/// `info!` - Important operational event
pub struct GraphBuilt {
    pub unit_count: usize,
    pub edge_count: usize,
}

impl Display for GraphBuilt {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Dependency graph built: {} units, {} edges",
            self.unit_count, self.edge_count
        )
    }
}

impl StructuredLog for GraphBuilt {
    fn log(&self) {
        tracing::info!(
            unit_count = self.unit_count,
            edge_count = self.edge_count,
            "{}", self
        );
    }
}
