// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunResult {
    pub target: String,
    /// Units that ran and committed, in execution order
    pub executed: Vec<String>,
    /// Units whose outputs were already present
    pub skipped: Vec<String>,
}

/// How a front end should describe a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every unit in the plan was already satisfied
    NothingToDo,
    Ran,
}

impl RunResult {
    pub fn outcome(&self) -> RunOutcome {
        if self.executed.is_empty() {
            RunOutcome::NothingToDo
        } else {
            RunOutcome::Ran
        }
    }
}

/// States a single run moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Planning,
    Resolving,
    Executing,
    Committing,
    Done,
    Failed,
}

impl Display for RunPhase {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let name = match self {
            RunPhase::Planning => "planning",
            RunPhase::Resolving => "resolving",
            RunPhase::Executing => "executing",
            RunPhase::Committing => "committing",
            RunPhase::Done => "done",
            RunPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Whether a unit's outputs are all in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    /// At least one declared output is missing, or the unit declares none
    Pending,
    /// Every declared output is present; a run would skip the unit
    Ready,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitState {
    pub unit: String,
    pub status: UnitStatus,
    /// Declared outputs not yet in the store
    pub missing: Vec<String>,
}

/// A stored variable and the unit declared to produce it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableInfo {
    pub name: String,
    /// `None` when no registered unit produces the variable, e.g. it was
    /// seeded by hand or its producer has since been removed
    pub producer: Option<String>,
}
