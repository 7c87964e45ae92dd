// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

use crate::config::{DependencyGraph, Registry, UnitDescriptor, UnitMap};
use crate::engine::guards::UnitGuards;
use crate::engine::plan::{ExecutionPlan, StepAction};
use crate::engine::result::{RunPhase, RunResult, UnitState, UnitStatus, VariableInfo};
use crate::errors::{ExecutionError, GraphError, StoreError, UnitError};
use crate::observability::messages::engine::{
    PhaseEntered, PlanResolved, RunCompleted, RunFailed, RunStarted, UnitSkipped,
};
use crate::observability::messages::unit::{
    UndeclaredOutputIgnored, UnitExecutionCompleted, UnitExecutionFailed, UnitExecutionStarted,
};
use crate::observability::messages::StructuredLog;
use crate::store::{StoreSnapshot, VariableStore};
use crate::traits::{ExecutionContext, UnitOutputs, Variables};

/// Lazy, presence-based executor for unit dependency chains.
///
/// Given a target, the scheduler orders the target's dependency closure,
/// skips every unit whose outputs are already in the store or that only feeds
/// skipped units, and runs the rest one after another, committing each unit's outputs before the next
/// starts.
///
/// Cloning is cheap and clones share the graph, the store and the per-unit
/// guards, so concurrent runs can be spawned from clones. Two runs never
/// execute the same unit body at the same time.
///
/// # Failure semantics
/// - Structural problems (unknown unit, unresolved input) are found before
///   anything runs.
/// - A failing unit stops its run. Units committed before it stay committed;
///   its own partial outputs are discarded.
/// - A store clear while a run is in flight stops the run before its next unit.
#[derive(Clone)]
pub struct Scheduler {
    graph: Arc<DependencyGraph>,
    units: UnitMap,
    store: Arc<VariableStore>,
    guards: UnitGuards,
}

impl Scheduler {
    pub fn new(graph: DependencyGraph, units: UnitMap, store: Arc<VariableStore>) -> Self {
        Self {
            graph: Arc::new(graph),
            units,
            store,
            guards: UnitGuards::new(),
        }
    }

    /// Build the graph from `registry` and wire it to `store`.
    pub fn from_registry(
        registry: &Registry,
        store: Arc<VariableStore>,
    ) -> Result<Self, GraphError> {
        Ok(Self::new(registry.build_graph()?, registry.unit_map(), store))
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn store(&self) -> &Arc<VariableStore> {
        &self.store
    }

    /// Resolve the plan for `target` against the current store without
    /// running anything.
    pub fn plan(&self, target: &str) -> Result<ExecutionPlan, ExecutionError> {
        ExecutionPlan::resolve(&self.graph, &self.units, target, self.store.snapshot())
    }

    /// Make every output of `target` available, running whatever is missing.
    pub async fn run(&self, target: &str) -> Result<RunResult, ExecutionError> {
        let start_msg = RunStarted { target };
        let span = start_msg.span("run");
        start_msg.log();

        async {
            let started = Instant::now();
            match self.run_plan(target).await {
                Ok(result) => {
                    self.enter(target, RunPhase::Done);
                    RunCompleted {
                        target,
                        executed: result.executed.len(),
                        skipped: result.skipped.len(),
                        duration: started.elapsed(),
                    }
                    .log();
                    Ok(result)
                }
                Err(error) => {
                    self.enter(target, RunPhase::Failed);
                    RunFailed {
                        target,
                        error: &error,
                    }
                    .log();
                    Err(error)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Forget every computed variable, in memory and on disk.
    ///
    /// Runs in flight when this happens stop before their next unit with
    /// `SnapshotInvalidated`.
    pub fn clear_memory(&self) -> Result<(), StoreError> {
        self.store.clear_all()
    }

    /// Ready when every declared output of `unit` is in the store.
    pub fn status(&self, unit: &str) -> Result<UnitState, GraphError> {
        let descriptor = self.graph.descriptor(unit)?;
        Ok(unit_state(descriptor, &self.store.snapshot()))
    }

    /// Status of every unit, in declaration order.
    pub fn statuses(&self) -> Vec<UnitState> {
        let snapshot = self.store.snapshot();
        self.graph
            .descriptors()
            .iter()
            .map(|d| unit_state(d, &snapshot))
            .collect()
    }

    /// Every stored variable with its producing unit, sorted by name.
    pub fn variables(&self) -> Vec<VariableInfo> {
        self.store
            .names()
            .into_iter()
            .map(|name| VariableInfo {
                producer: self.graph.producer_of(&name).map(str::to_string),
                name,
            })
            .collect()
    }

    /// Current value of a stored variable.
    pub fn variable(&self, name: &str) -> Option<Value> {
        self.store.get(name)
    }

    async fn run_plan(&self, target: &str) -> Result<RunResult, ExecutionError> {
        self.enter(target, RunPhase::Planning);
        let snapshot = self.store.snapshot();

        self.enter(target, RunPhase::Resolving);
        let plan = ExecutionPlan::resolve(&self.graph, &self.units, target, snapshot)?;
        PlanResolved {
            target,
            to_run: plan.to_run().count(),
            to_skip: plan.to_skip().count(),
        }
        .log();

        let generation = plan.snapshot().generation();
        let mut executed = Vec::new();
        let mut skipped = Vec::new();

        for step in &plan.steps {
            let unit = step.unit.as_str();
            if step.action == StepAction::Skip {
                UnitSkipped { target, unit }.log();
                skipped.push(step.unit.clone());
                continue;
            }

            let _guard = self.guards.acquire(unit).await;

            // Re-read the store under the guard: it may have been cleared, or
            // another run may have produced this unit's outputs meanwhile.
            let current = self.store.snapshot();
            if current.generation() != generation {
                return Err(ExecutionError::SnapshotInvalidated {
                    unit: step.unit.clone(),
                    executed,
                });
            }

            let descriptor = self.graph.descriptor(unit).map_err(|_| {
                ExecutionError::UnknownUnit {
                    unit: step.unit.clone(),
                }
            })?;
            if !descriptor.produces.is_empty() && current.has_all(&descriptor.produces) {
                UnitSkipped { target, unit }.log();
                skipped.push(step.unit.clone());
                continue;
            }

            self.enter(target, RunPhase::Executing);
            let Some(inputs) = collect_inputs(descriptor, &current) else {
                return Err(ExecutionError::SnapshotInvalidated {
                    unit: step.unit.clone(),
                    executed,
                });
            };

            let outputs = match self.execute_unit(descriptor, inputs).await {
                Ok(outputs) => outputs,
                Err(cause) => {
                    return Err(ExecutionError::UnitExecution {
                        unit: step.unit.clone(),
                        cause,
                        executed,
                    })
                }
            };

            self.enter(target, RunPhase::Committing);
            match self.commit(outputs, generation).await {
                Ok(true) => executed.push(step.unit.clone()),
                Ok(false) => {
                    return Err(ExecutionError::SnapshotInvalidated {
                        unit: step.unit.clone(),
                        executed,
                    })
                }
                Err(cause) => {
                    return Err(ExecutionError::Commit {
                        unit: step.unit.clone(),
                        cause,
                        executed,
                    })
                }
            }
        }

        Ok(RunResult {
            target: target.to_string(),
            executed,
            skipped,
        })
    }

    /// Run one body and keep exactly its declared outputs.
    async fn execute_unit(
        &self,
        descriptor: &UnitDescriptor,
        inputs: Variables,
    ) -> Result<UnitOutputs, UnitError> {
        let unit = descriptor.name.as_str();
        let body = self
            .units
            .get(unit)
            .cloned()
            .ok_or_else(|| UnitError::failed(format!("no body registered for unit '{}'", unit)))?;

        let start_msg = UnitExecutionStarted {
            unit,
            input_count: inputs.len(),
        };
        let span = start_msg.span("unit_execution");
        start_msg.log();

        let started = Instant::now();
        let ctx = ExecutionContext::new(unit, inputs);
        let result = tokio::spawn(async move { body.execute(ctx).await }.instrument(span))
            .await
            .map_err(UnitError::from)
            .and_then(|outputs| outputs)
            .and_then(|outputs| select_declared(descriptor, outputs));

        match &result {
            Ok(outputs) => UnitExecutionCompleted {
                unit,
                output_count: outputs.len(),
                duration: started.elapsed(),
            }
            .log(),
            Err(error) => UnitExecutionFailed { unit, error }.log(),
        }
        result
    }

    /// Write one unit's outputs as a single batch, unless the store was cleared.
    async fn commit(&self, outputs: UnitOutputs, generation: u64) -> Result<bool, StoreError> {
        let store = Arc::clone(&self.store);
        let written = tokio::task::spawn_blocking(move || {
            store.put_batch_in_generation(outputs, generation)
        })
        .await
        .map_err(|e| StoreError::Io {
            path: self
                .store
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            message: e.to_string(),
        })??;
        Ok(written.is_some())
    }

    fn enter(&self, target: &str, phase: RunPhase) {
        PhaseEntered {
            target,
            phase: &phase.to_string(),
        }
        .log();
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("units", &self.graph.nodes())
            .field("store", &self.store.path())
            .finish()
    }
}

/// The unit's declared inputs, or `None` if the store lost one of them.
fn collect_inputs(descriptor: &UnitDescriptor, snapshot: &StoreSnapshot) -> Option<Variables> {
    descriptor
        .requires
        .iter()
        .map(|name| snapshot.get(name).map(|value| (name.clone(), value.clone())))
        .collect()
}

/// Fail if a declared output is missing; drop undeclared ones with a warning.
fn select_declared(
    descriptor: &UnitDescriptor,
    outputs: UnitOutputs,
) -> Result<UnitOutputs, UnitError> {
    let missing: Vec<String> = descriptor
        .produces
        .iter()
        .filter(|name| !outputs.contains_key(*name))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(UnitError::MissingOutputs { variables: missing });
    }

    let mut declared = BTreeMap::new();
    for (name, value) in outputs {
        if descriptor.produces.contains(&name) {
            declared.insert(name, value);
        } else {
            UndeclaredOutputIgnored {
                unit: &descriptor.name,
                variable: &name,
            }
            .log();
        }
    }
    Ok(declared)
}

fn unit_state(descriptor: &UnitDescriptor, snapshot: &StoreSnapshot) -> UnitState {
    let missing: Vec<String> = descriptor
        .produces
        .iter()
        .filter(|name| !snapshot.has(name))
        .cloned()
        .collect();
    let status = if descriptor.produces.is_empty() || !missing.is_empty() {
        UnitStatus::Pending
    } else {
        UnitStatus::Ready
    };

    UnitState {
        unit: descriptor.name.clone(),
        status,
        missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::{FailingUnit, StubUnit};
    use serde_json::json;

    fn scheduler(registry: &Registry) -> Scheduler {
        Scheduler::from_registry(registry, Arc::new(VariableStore::in_memory())).unwrap()
    }

    #[tokio::test]
    async fn test_undeclared_outputs_are_not_committed() {
        let mut registry = Registry::new();
        registry
            .register(
                "a",
                ["x"],
                Vec::<String>::new(),
                Arc::new(StubUnit::producing([("x", json!(1)), ("scratch", json!(2))])),
            )
            .unwrap();
        let scheduler = scheduler(&registry);

        scheduler.run("a").await.unwrap();

        assert!(scheduler.store().has("x"));
        assert!(!scheduler.store().has("scratch"));
    }

    #[tokio::test]
    async fn test_missing_declared_output_fails_the_unit() {
        let mut registry = Registry::new();
        registry
            .register(
                "a",
                ["x", "w"],
                Vec::<String>::new(),
                Arc::new(StubUnit::producing([("x", json!(1))])),
            )
            .unwrap();
        let scheduler = scheduler(&registry);

        let err = scheduler.run("a").await.unwrap_err();

        assert_eq!(
            err,
            ExecutionError::UnitExecution {
                unit: "a".to_string(),
                cause: UnitError::MissingOutputs {
                    variables: vec!["w".to_string()]
                },
                executed: vec![],
            }
        );
        assert!(scheduler.store().is_empty());
    }

    #[tokio::test]
    async fn test_context_holds_only_declared_inputs() {
        let consumer = StubUnit::producing([("y", json!("ok"))]);
        let mut registry = Registry::new();
        registry
            .register(
                "a",
                ["x", "extra"],
                Vec::<String>::new(),
                Arc::new(StubUnit::producing([("x", json!(1)), ("extra", json!(2))])),
            )
            .unwrap();
        registry
            .register("b", ["y"], ["x"], Arc::new(consumer.clone()))
            .unwrap();
        let scheduler = scheduler(&registry);

        scheduler.run("b").await.unwrap();

        assert_eq!(
            consumer.seen_inputs(),
            vec![Variables::from([("x".to_string(), json!(1))])]
        );
    }

    #[tokio::test]
    async fn test_status_reports_missing_outputs() {
        let mut registry = Registry::new();
        registry
            .register(
                "a",
                ["x", "w"],
                Vec::<String>::new(),
                Arc::new(StubUnit::new()),
            )
            .unwrap();
        registry
            .register("log", Vec::<String>::new(), ["x"], Arc::new(StubUnit::new()))
            .unwrap();
        let scheduler = scheduler(&registry);
        scheduler.store().put("x", json!(1)).unwrap();

        let state = scheduler.status("a").unwrap();
        assert_eq!(state.status, UnitStatus::Pending);
        assert_eq!(state.missing, vec!["w"]);

        scheduler.store().put("w", json!(2)).unwrap();
        assert_eq!(scheduler.status("a").unwrap().status, UnitStatus::Ready);

        let statuses = scheduler.statuses();
        assert_eq!(statuses[1].unit, "log");
        assert_eq!(statuses[1].status, UnitStatus::Pending);
        assert!(matches!(
            scheduler.status("nope"),
            Err(GraphError::UnknownUnit { .. })
        ));
    }

    #[tokio::test]
    async fn test_variables_list_producers_and_values() {
        let mut registry = Registry::new();
        registry
            .register(
                "load",
                ["df_initial"],
                Vec::<String>::new(),
                Arc::new(StubUnit::producing([("df_initial", json!([{"sales": 10}]))])),
            )
            .unwrap();
        let scheduler = scheduler(&registry);
        scheduler.store().put("manual", json!("seeded")).unwrap();

        scheduler.run("load").await.unwrap();

        assert_eq!(
            scheduler.variables(),
            vec![
                VariableInfo {
                    name: "df_initial".to_string(),
                    producer: Some("load".to_string()),
                },
                VariableInfo {
                    name: "manual".to_string(),
                    producer: None,
                },
            ]
        );
        assert_eq!(scheduler.variable("df_initial"), Some(json!([{"sales": 10}])));
        assert_eq!(scheduler.variable("absent"), None);
    }

    #[tokio::test]
    async fn test_failure_message_reaches_caller() {
        let mut registry = Registry::new();
        registry
            .register(
                "a",
                ["x"],
                Vec::<String>::new(),
                Arc::new(FailingUnit::new("file not found: ventas.csv")),
            )
            .unwrap();
        let scheduler = scheduler(&registry);

        let err = scheduler.run("a").await.unwrap_err();

        assert_eq!(err.failed_unit(), Some("a"));
        assert!(err.to_string().contains("ventas.csv"));
    }
}
