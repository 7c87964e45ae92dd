// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;
use thiserror::Error;

use super::StoreError;

/// Errors that end a single `run` request.
///
/// Variants that can happen after execution started carry `executed`, the
/// units that ran and committed before the failure. Their outputs stay in the
/// store.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExecutionError {
    /// The requested unit, or a unit in its plan, is not registered
    #[error("Unknown unit: '{unit}'")]
    UnknownUnit { unit: String },

    /// A required variable is absent and nothing in the plan produces it.
    /// Raised before any unit executes.
    #[error("Variable '{variable}' required by '{needed_by}' is not present and no unit produces it (requested by '{requested_by}')")]
    UnresolvedDependency {
        variable: String,
        /// The target of the run request
        requested_by: String,
        /// The unit in the plan that declares the requirement
        needed_by: String,
    },

    /// A unit body failed; the rest of the plan was abandoned
    #[error("Unit '{unit}' failed: {cause}")]
    UnitExecution {
        unit: String,
        cause: UnitError,
        executed: Vec<String>,
    },

    /// The store was cleared while this run was in flight
    #[error("Variable store was cleared while the plan was running; stopped before unit '{unit}'")]
    SnapshotInvalidated { unit: String, executed: Vec<String> },

    /// Outputs of a successful unit could not be persisted
    #[error("Failed to commit outputs of unit '{unit}': {cause}")]
    Commit {
        unit: String,
        #[source]
        cause: StoreError,
        executed: Vec<String>,
    },
}

impl ExecutionError {
    /// Units that ran and committed before the failure.
    pub fn executed(&self) -> &[String] {
        match self {
            ExecutionError::UnitExecution { executed, .. }
            | ExecutionError::SnapshotInvalidated { executed, .. }
            | ExecutionError::Commit { executed, .. } => executed,
            ExecutionError::UnknownUnit { .. } | ExecutionError::UnresolvedDependency { .. } => &[],
        }
    }

    /// The unit the plan stopped at, if execution had started.
    pub fn failed_unit(&self) -> Option<&str> {
        match self {
            ExecutionError::UnitExecution { unit, .. }
            | ExecutionError::SnapshotInvalidated { unit, .. }
            | ExecutionError::Commit { unit, .. } => Some(unit),
            ExecutionError::UnknownUnit { .. } | ExecutionError::UnresolvedDependency { .. } => None,
        }
    }
}

/// Why a unit body did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnitError {
    /// The body reported a failure of its own
    #[error("{message}")]
    Failed { message: String },

    /// A script process exited unsuccessfully
    #[error("process exited with {}; stderr: {stderr}", .code.map(|c| c.to_string()).unwrap_or_else(|| "signal".to_string()))]
    NonZeroExit { code: Option<i32>, stderr: String },

    /// A script process could not be started
    #[error("failed to start '{program}': {message}")]
    Spawn { program: String, message: String },

    #[error("I/O error while running unit: {message}")]
    Io { message: String },

    /// The body returned something that is not a variable map
    #[error("invalid output: {message}")]
    InvalidOutput { message: String },

    /// The body finished without producing every declared variable
    #[error("declared outputs were not produced: {}", .variables.join(", "))]
    MissingOutputs { variables: Vec<String> },

    #[error("unit body panicked: {message}")]
    Panicked { message: String },
}

impl UnitError {
    pub fn failed(message: impl Into<String>) -> Self {
        UnitError::Failed {
            message: message.into(),
        }
    }
}

impl From<tokio::task::JoinError> for UnitError {
    fn from(error: tokio::task::JoinError) -> Self {
        if !error.is_panic() {
            return UnitError::failed(format!("unit task did not complete: {}", error));
        }

        let payload = error.into_panic();
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string());
        UnitError::Panicked { message }
    }
}
