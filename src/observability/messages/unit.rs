// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for unit body execution.
//!
//! This module contains message types for logging events related to:
//! * Unit execution lifecycle (start, completion, failure)
//! * Output capture and undeclared outputs
//! * Script process output streams

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Unit execution started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use scriptflow::observability::messages::unit::UnitExecutionStarted;
///
/// let msg = UnitExecutionStarted {
///     unit: "load_sales",
///     input_count: 0,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct UnitExecutionStarted<'a> {
    pub unit: &'a str,
    pub input_count: usize,
}

impl Display for UnitExecutionStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Unit '{}' execution started with {} input variables",
            self.unit, self.input_count
        )
    }
}

impl StructuredLog for UnitExecutionStarted<'_> {
    fn log(&self) {
        tracing::info!(unit = self.unit, input_count = self.input_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "unit_execution",
            span_name = name,
            unit = self.unit,
            input_count = self.input_count,
        )
    }
}

/// Unit execution completed and its outputs were captured.
///
/// # Log Level
/// `info!` - Important operational event
pub struct UnitExecutionCompleted<'a> {
    pub unit: &'a str,
    pub output_count: usize,
    pub duration: std::time::Duration,
}

impl Display for UnitExecutionCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Unit '{}' completed: {} outputs, duration={:?}",
            self.unit, self.output_count, self.duration
        )
    }
}

impl StructuredLog for UnitExecutionCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            unit = self.unit,
            output_count = self.output_count,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }
}

/// Unit execution failed.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct UnitExecutionFailed<'a> {
    pub unit: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for UnitExecutionFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Unit '{}' failed: {}", self.unit, self.error)
    }
}

impl StructuredLog for UnitExecutionFailed<'_> {
    fn log(&self) {
        tracing::error!(unit = self.unit, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "unit_failed",
            span_name = name,
            unit = self.unit,
            error = %self.error,
        )
    }
}

/// A unit returned a variable it never declared; it is dropped.
///
/// # Log Level
/// `warn!` - Potential issue
pub struct UndeclaredOutputIgnored<'a> {
    pub unit: &'a str,
    pub variable: &'a str,
}

impl Display for UndeclaredOutputIgnored<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Unit '{}' returned undeclared variable '{}'; ignoring it",
            self.unit, self.variable
        )
    }
}

impl StructuredLog for UndeclaredOutputIgnored<'_> {
    fn log(&self) {
        tracing::warn!(unit = self.unit, variable = self.variable, "{}", self);
    }
}

/// Output captured from a script process.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
pub struct ScriptOutput<'a> {
    pub unit: &'a str,
    pub stream: &'a str,
    pub content: &'a str,
}

impl Display for ScriptOutput<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "[{} {}] {}", self.unit, self.stream, self.content)
    }
}

impl StructuredLog for ScriptOutput<'_> {
    fn log(&self) {
        tracing::debug!(
            unit = self.unit,
            stream = self.stream,
            bytes = self.content.len(),
            "{}", self
        );
    }
}
