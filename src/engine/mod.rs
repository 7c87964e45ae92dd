// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The execution scheduler.
//!
//! A run request moves through `Planning → Resolving → Executing →
//! Committing → Done`, or ends in `Failed` from any of them. Planning orders
//! the target's dependency closure, resolving decides what can be skipped,
//! and each unit that runs has its outputs committed to the variable store
//! before the next one starts.

pub mod guards;
pub mod plan;
pub mod result;
pub mod scheduler;
#[cfg(test)]
pub mod integration_tests;

pub use guards::UnitGuards;
pub use plan::{ExecutionPlan, PlanStep, StepAction};
pub use result::{RunOutcome, RunPhase, RunResult, UnitState, UnitStatus, VariableInfo};
pub use scheduler::Scheduler;
