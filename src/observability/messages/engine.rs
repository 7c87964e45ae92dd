// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for scheduler run lifecycle events.
//!
//! This module contains message types for logging events related to:
//! * Run requests (start, completion, failure)
//! * Phase transitions of a single run
//! * Plan resolution and skip decisions

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A run request was accepted and planning started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use scriptflow::observability::messages::engine::RunStarted;
///
/// let msg = RunStarted { target: "report" };
///
/// tracing::info!("{}", msg);
/// ```
pub struct RunStarted<'a> {
    pub target: &'a str,
}

impl Display for RunStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Run requested for unit '{}'", self.target)
    }
}

impl StructuredLog for RunStarted<'_> {
    fn log(&self) {
        tracing::info!(target_unit = self.target, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("run", span_name = name, target_unit = self.target)
    }
}

/// A run moved from one phase of its state machine to the next.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
pub struct PhaseEntered<'a> {
    pub target: &'a str,
    pub phase: &'a str,
}

impl Display for PhaseEntered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Run for '{}' entered phase {}", self.target, self.phase)
    }
}

impl StructuredLog for PhaseEntered<'_> {
    fn log(&self) {
        tracing::debug!(target_unit = self.target, phase = self.phase, "{}", self);
    }
}

/// The plan for a target was resolved against the store snapshot.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use scriptflow::observability::messages::engine::PlanResolved;
///
/// let msg = PlanResolved {
///     target: "report",
///     to_run: 2,
///     to_skip: 1,
/// };
///
/// assert_eq!(msg.to_string(), "Plan for 'report' resolved: 2 to run, 1 to skip");
/// ```
pub struct PlanResolved<'a> {
    pub target: &'a str,
    pub to_run: usize,
    pub to_skip: usize,
}

impl Display for PlanResolved<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Plan for '{}' resolved: {} to run, {} to skip",
            self.target, self.to_run, self.to_skip
        )
    }
}

impl StructuredLog for PlanResolved<'_> {
    fn log(&self) {
        tracing::info!(
            target_unit = self.target,
            to_run = self.to_run,
            to_skip = self.to_skip,
            "{}", self
        );
    }
}

/// A unit was skipped: its outputs are present, or nothing that runs needs them.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
pub struct UnitSkipped<'a> {
    pub target: &'a str,
    pub unit: &'a str,
}

impl Display for UnitSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Skipping unit '{}' (outputs present or not needed) while running '{}'",
            self.unit, self.target
        )
    }
}

impl StructuredLog for UnitSkipped<'_> {
    fn log(&self) {
        tracing::debug!(target_unit = self.target, unit = self.unit, "{}", self);
    }
}

/// A run finished and every planned unit either ran or was skipped.
///
/// # Log Level
/// `info!` - Important operational event
pub struct RunCompleted<'a> {
    pub target: &'a str,
    pub executed: usize,
    pub skipped: usize,
    pub duration: std::time::Duration,
}

impl Display for RunCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.executed == 0 {
            write!(
                f,
                "Nothing to do for '{}': {} units already satisfied",
                self.target, self.skipped
            )
        } else {
            write!(
                f,
                "Run for '{}' completed: {} executed, {} skipped in {:?}",
                self.target, self.executed, self.skipped, self.duration
            )
        }
    }
}

impl StructuredLog for RunCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            target_unit = self.target,
            executed = self.executed,
            skipped = self.skipped,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "run_completed",
            span_name = name,
            target_unit = self.target,
            executed = self.executed,
            skipped = self.skipped,
        )
    }
}

/// A run failed.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use scriptflow::observability::messages::engine::RunFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "test error");
/// let msg = RunFailed {
///     target: "report",
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct RunFailed<'a> {
    pub target: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for RunFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Run for '{}' failed: {}", self.target, self.error)
    }
}

impl StructuredLog for RunFailed<'_> {
    fn log(&self) {
        tracing::error!(target_unit = self.target, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "run_failed",
            span_name = name,
            target_unit = self.target,
            error = %self.error,
        )
    }
}
