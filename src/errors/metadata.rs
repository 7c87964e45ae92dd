// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;
use thiserror::Error;

/// A unit whose declared markers could not be turned into a descriptor.
///
/// Reported per unit; a scan keeps going and simply leaves the unit out.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename = "malformed_metadata")]
#[error("Malformed metadata in unit '{unit}': {issue}")]
pub struct MalformedMetadataError {
    /// Name of the offending unit
    pub unit: String,
    /// 1-based line of the offending marker, when it came from a script body
    pub line: Option<usize>,
    /// What exactly was wrong
    pub issue: MetadataIssue,
}

impl MalformedMetadataError {
    pub fn new(unit: impl Into<String>, issue: MetadataIssue) -> Self {
        Self {
            unit: unit.into(),
            line: None,
            issue,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum MetadataIssue {
    /// A marker with no variable list, or an empty entry such as `a,,b`
    #[error("empty variable name in {marker} marker")]
    EmptyVariableName { marker: String },

    /// A declared name that is not an identifier
    #[error("'{name}' is not a valid variable name in {marker} marker")]
    InvalidVariableName { marker: String, name: String },

    /// The same variable is both required and produced by one unit
    #[error("variable '{variable}' is declared as both required and produced")]
    ConflictingDeclaration { variable: String },

    /// An `ORCHESTRATOR.<KEY>` marker with a key the parser does not know
    #[error("unknown marker '{marker}'")]
    UnknownMarker { marker: String },

    #[error("'{name}' is not a valid unit name")]
    InvalidUnitName { name: String },

    /// The script body could not be read from disk
    #[error("failed to read script: {message}")]
    Unreadable { message: String },

    /// A scanned descriptor whose location has no process to run
    #[error("no executable body for {location} location")]
    NoExecutableBody { location: String },
}
