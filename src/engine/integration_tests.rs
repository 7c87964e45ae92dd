// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use crate::backends::stub::{FailingUnit, PanickingUnit, StubUnit};
use crate::config::Registry;
use crate::engine::{RunOutcome, Scheduler};
use crate::errors::{ExecutionError, GraphError, UnitError};
use crate::store::VariableStore;

/// End-to-end scheduler behaviour over the registry, graph and store
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const NONE: [&str; 0] = [];

    struct Chain {
        scheduler: Scheduler,
        a: StubUnit,
        b: StubUnit,
    }

    /// A(→x), B(x→y)
    fn chain(store: Arc<VariableStore>) -> Chain {
        let a = StubUnit::producing([("x", json!(1))]);
        let b = StubUnit::producing([("y", json!(2))]);

        let mut registry = Registry::new();
        registry.register("A", ["x"], NONE, Arc::new(a.clone())).unwrap();
        registry.register("B", ["y"], ["x"], Arc::new(b.clone())).unwrap();

        Chain {
            scheduler: Scheduler::from_registry(&registry, store).unwrap(),
            a,
            b,
        }
    }

    #[tokio::test]
    async fn test_run_on_empty_store_executes_chain() {
        let chain = chain(Arc::new(VariableStore::in_memory()));

        let result = chain.scheduler.run("B").await.unwrap();

        assert_eq!(result.executed, vec!["A", "B"]);
        assert!(result.skipped.is_empty());
        assert_eq!(result.outcome(), RunOutcome::Ran);
        assert_eq!(chain.scheduler.store().names(), vec!["x", "y"]);
    }

    #[tokio::test]
    async fn test_second_run_executes_nothing() {
        let chain = chain(Arc::new(VariableStore::in_memory()));
        chain.scheduler.run("B").await.unwrap();

        let result = chain.scheduler.run("B").await.unwrap();

        assert!(result.executed.is_empty());
        assert_eq!(result.skipped, vec!["A", "B"]);
        assert_eq!(result.outcome(), RunOutcome::NothingToDo);
        assert_eq!(chain.a.calls(), 1);
        assert_eq!(chain.b.calls(), 1);
    }

    #[tokio::test]
    async fn test_satisfied_target_does_not_run_its_ancestors() {
        let store = Arc::new(VariableStore::in_memory());
        store.put("y", json!(2)).unwrap();
        let chain = chain(store);

        let result = chain.scheduler.run("B").await.unwrap();

        assert!(result.executed.is_empty());
        assert_eq!(result.skipped, vec!["A", "B"]);
        assert_eq!(result.outcome(), RunOutcome::NothingToDo);
        assert_eq!(chain.a.calls(), 0);
        assert!(!chain.scheduler.store().has("x"));
    }

    #[tokio::test]
    async fn test_unresolved_dependency_runs_nothing() {
        let a = StubUnit::producing([("x", json!(1))]);
        let c = StubUnit::producing([("w", json!(3))]);
        let mut registry = Registry::new();
        registry.register("A", ["x"], NONE, Arc::new(a.clone())).unwrap();
        registry.register("C", ["w"], ["x", "z"], Arc::new(c.clone())).unwrap();
        let scheduler =
            Scheduler::from_registry(&registry, Arc::new(VariableStore::in_memory())).unwrap();

        let err = scheduler.run("C").await.unwrap_err();

        assert!(matches!(
            err,
            ExecutionError::UnresolvedDependency { ref variable, ref requested_by, .. }
                if variable == "z" && requested_by == "C"
        ));
        assert_eq!(a.calls(), 0);
        assert!(scheduler.store().is_empty());
    }

    #[tokio::test]
    async fn test_cycle_is_rejected_at_build_time() {
        let mut registry = Registry::new();
        registry.register("A", ["x"], ["y"], Arc::new(StubUnit::new())).unwrap();
        registry.register("B", ["y"], ["x"], Arc::new(StubUnit::new())).unwrap();

        let err = Scheduler::from_registry(&registry, Arc::new(VariableStore::in_memory()))
            .unwrap_err();

        assert_eq!(
            err,
            GraphError::CycleDetected {
                cycle: vec!["A".to_string(), "B".to_string(), "A".to_string()]
            }
        );
    }

    #[tokio::test]
    async fn test_clear_memory_forces_rerun() {
        let chain = chain(Arc::new(VariableStore::in_memory()));
        chain.scheduler.run("B").await.unwrap();

        chain.scheduler.clear_memory().unwrap();
        let result = chain.scheduler.run("B").await.unwrap();

        assert_eq!(result.executed, vec!["A", "B"]);
        assert_eq!(chain.a.calls(), 2);
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_earlier_commits() {
        let mut registry = Registry::new();
        registry
            .register("A", ["x"], NONE, Arc::new(StubUnit::producing([("x", json!(1))])))
            .unwrap();
        registry
            .register("B", ["y"], ["x"], Arc::new(FailingUnit::new("bad column")))
            .unwrap();
        let c = StubUnit::producing([("z", json!(3))]);
        registry.register("C", ["z"], ["y"], Arc::new(c.clone())).unwrap();
        let scheduler =
            Scheduler::from_registry(&registry, Arc::new(VariableStore::in_memory())).unwrap();

        let err = scheduler.run("C").await.unwrap_err();

        assert_eq!(
            err,
            ExecutionError::UnitExecution {
                unit: "B".to_string(),
                cause: UnitError::failed("bad column"),
                executed: vec!["A".to_string()],
            }
        );
        assert_eq!(scheduler.store().names(), vec!["x"]);
        assert_eq!(c.calls(), 0);
    }

    #[tokio::test]
    async fn test_panicking_unit_fails_the_run() {
        let mut registry = Registry::new();
        registry.register("A", ["x"], NONE, Arc::new(PanickingUnit)).unwrap();
        let scheduler =
            Scheduler::from_registry(&registry, Arc::new(VariableStore::in_memory())).unwrap();

        let err = scheduler.run("A").await.unwrap_err();

        assert!(matches!(
            err,
            ExecutionError::UnitExecution { cause: UnitError::Panicked { .. }, .. }
        ));
        assert!(scheduler.store().is_empty());
    }

    #[tokio::test]
    async fn test_results_survive_a_new_engine() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state.json");
        {
            let chain = chain(Arc::new(VariableStore::open(&path).unwrap()));
            chain.scheduler.run("B").await.unwrap();
        }

        let chain = chain(Arc::new(VariableStore::open(&path).unwrap()));
        let result = chain.scheduler.run("B").await.unwrap();

        assert_eq!(result.outcome(), RunOutcome::NothingToDo);
        assert_eq!(chain.a.calls(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_runs_execute_shared_unit_once() {
        let a = StubUnit::producing([("x", json!(1))]).with_delay(Duration::from_millis(50));
        let b = StubUnit::producing([("y", json!(2))]);
        let c = StubUnit::producing([("z", json!(3))]);
        let mut registry = Registry::new();
        registry.register("A", ["x"], NONE, Arc::new(a.clone())).unwrap();
        registry.register("B", ["y"], ["x"], Arc::new(b.clone())).unwrap();
        registry.register("C", ["z"], ["x"], Arc::new(c.clone())).unwrap();
        let scheduler =
            Scheduler::from_registry(&registry, Arc::new(VariableStore::in_memory())).unwrap();

        let (left, right) = tokio::join!(
            {
                let scheduler = scheduler.clone();
                tokio::spawn(async move { scheduler.run("B").await })
            },
            {
                let scheduler = scheduler.clone();
                tokio::spawn(async move { scheduler.run("C").await })
            }
        );
        let left = left.unwrap().unwrap();
        let right = right.unwrap().unwrap();

        assert_eq!(a.calls(), 1);
        assert_eq!(a.max_concurrent(), 1);
        let ran_a = [&left, &right]
            .iter()
            .filter(|r| r.executed.contains(&"A".to_string()))
            .count();
        assert_eq!(ran_a, 1);
        assert_eq!(scheduler.store().names(), vec!["x", "y", "z"]);
    }

    #[tokio::test]
    async fn test_clear_during_run_invalidates_snapshot() {
        let a = StubUnit::producing([("x", json!(1))]).with_delay(Duration::from_millis(100));
        let b = StubUnit::producing([("y", json!(2))]);
        let mut registry = Registry::new();
        registry.register("A", ["x"], NONE, Arc::new(a.clone())).unwrap();
        registry.register("B", ["y"], ["x"], Arc::new(b.clone())).unwrap();
        let scheduler =
            Scheduler::from_registry(&registry, Arc::new(VariableStore::in_memory())).unwrap();

        let run = {
            let scheduler = scheduler.clone();
            tokio::spawn(async move { scheduler.run("B").await })
        };
        tokio::time::sleep(Duration::from_millis(30)).await;
        scheduler.clear_memory().unwrap();

        let err = run.await.unwrap().unwrap_err();

        assert_eq!(
            err,
            ExecutionError::SnapshotInvalidated {
                unit: "A".to_string(),
                executed: vec![],
            }
        );
        assert_eq!(b.calls(), 0);
        assert!(scheduler.store().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_target() {
        let chain = chain(Arc::new(VariableStore::in_memory()));

        let err = chain.scheduler.run("Z").await.unwrap_err();

        assert_eq!(
            err,
            ExecutionError::UnknownUnit {
                unit: "Z".to_string()
            }
        );
    }
}
