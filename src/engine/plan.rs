// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;
use std::collections::HashSet;

use crate::config::{DependencyGraph, UnitMap};
use crate::errors::{ExecutionError, GraphError};
use crate::store::StoreSnapshot;

/// What a plan step will do with its unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepAction {
    Run,
    /// Every declared output is already present, or nothing that runs
    /// needs the unit's outputs
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanStep {
    pub unit: String,
    pub action: StepAction,
}

/// The ordered steps needed to satisfy one target, resolved against a store
/// snapshot.
///
/// Plans are computed per request and thrown away afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionPlan {
    pub target: String,
    pub steps: Vec<PlanStep>,
    #[serde(skip)]
    snapshot: StoreSnapshot,
}

impl ExecutionPlan {
    /// Order the target's dependency closure and decide run or skip per unit.
    ///
    /// A unit is skipped when it declares outputs and all of them are present.
    /// A unit that declares none always runs when it is the target. Producers
    /// run only when a unit that runs needs a variable missing from the
    /// snapshot, so ancestors of a satisfied unit are skipped too. Every
    /// requirement of a unit that will run must be present in the snapshot or
    /// have a producer; the first one that has neither fails the whole plan.
    pub(crate) fn resolve(
        graph: &DependencyGraph,
        units: &UnitMap,
        target: &str,
        snapshot: StoreSnapshot,
    ) -> Result<Self, ExecutionError> {
        let order = graph
            .transitive_dependency_order(target)
            .map_err(unknown_unit)?;

        // Walk from the target back to the roots, pulling in only the
        // producers of variables that a running unit is missing.
        let mut needed = HashSet::from([target]);
        let mut actions = Vec::with_capacity(order.len());
        for &unit in order.iter().rev() {
            let descriptor = graph.descriptor(unit).map_err(unknown_unit)?;
            let satisfied =
                !descriptor.produces.is_empty() && snapshot.has_all(&descriptor.produces);

            if !needed.contains(unit) || satisfied {
                actions.push(StepAction::Skip);
                continue;
            }

            needed.extend(
                descriptor
                    .requires
                    .iter()
                    .filter(|v| !snapshot.has(v))
                    .filter_map(|v| graph.producer_of(v)),
            );
            actions.push(StepAction::Run);
        }
        actions.reverse();

        let mut steps = Vec::with_capacity(order.len());
        for (unit, action) in order.into_iter().zip(actions) {
            if !units.contains_key(unit) {
                return Err(ExecutionError::UnknownUnit {
                    unit: unit.to_string(),
                });
            }

            if action == StepAction::Run {
                let descriptor = graph.descriptor(unit).map_err(unknown_unit)?;
                if let Some(variable) = descriptor
                    .requires
                    .iter()
                    .find(|v| !snapshot.has(v) && graph.producer_of(v).is_none())
                {
                    return Err(ExecutionError::UnresolvedDependency {
                        variable: variable.clone(),
                        requested_by: target.to_string(),
                        needed_by: unit.to_string(),
                    });
                }
            }

            steps.push(PlanStep {
                unit: unit.to_string(),
                action,
            });
        }

        Ok(Self {
            target: target.to_string(),
            steps,
            snapshot,
        })
    }

    /// Units that will run, in execution order.
    pub fn to_run(&self) -> impl Iterator<Item = &str> {
        self.units_with(StepAction::Run)
    }

    pub fn to_skip(&self) -> impl Iterator<Item = &str> {
        self.units_with(StepAction::Skip)
    }

    /// True when every step is a skip.
    pub fn is_satisfied(&self) -> bool {
        self.steps.iter().all(|s| s.action == StepAction::Skip)
    }

    /// The store view the plan was resolved against.
    pub fn snapshot(&self) -> &StoreSnapshot {
        &self.snapshot
    }

    fn units_with(&self, action: StepAction) -> impl Iterator<Item = &str> {
        self.steps
            .iter()
            .filter(move |s| s.action == action)
            .map(|s| s.unit.as_str())
    }
}

fn unknown_unit(error: GraphError) -> ExecutionError {
    match error {
        GraphError::UnknownUnit { unit } => ExecutionError::UnknownUnit { unit },
        // Queries on a built graph only fail for unknown names.
        other => ExecutionError::UnknownUnit {
            unit: other.to_string(),
        },
    }
}
