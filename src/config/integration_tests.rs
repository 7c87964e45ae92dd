// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

#[cfg(test)]
mod integration_tests {
    use std::path::PathBuf;
    use tempfile::TempDir;

    use crate::config::{load_and_validate_config, EngineConfig, RuntimeBuilder, UnitLocation};
    use crate::engine::RunOutcome;
    use crate::errors::{ExecutionError, RuntimeError};

    /// Point the config's state file into a throwaway directory.
    fn isolated(mut config: EngineConfig, temp: &TempDir) -> EngineConfig {
        config.state_file = temp.path().join("state.json");
        config
    }

    /// The demo config loads, discovers its scripts and builds a graph
    #[test]
    fn test_demo_yaml_loading() {
        let config = load_and_validate_config("configs/demo.yaml").unwrap();

        assert_eq!(config.max_concurrency, 2);
        assert_eq!(config.scripts.interpreter, "python3");
        assert_eq!(config.units.len(), 1);
        assert_eq!(config.units[0].name, "tax_rate");
        assert_eq!(
            config.scripts.directory,
            Some(PathBuf::from("configs").join("../scripts"))
        );

        let temp = TempDir::new().unwrap();
        let runtime = RuntimeBuilder::from_config(&isolated(config, &temp)).unwrap();
        let graph = runtime.scheduler().graph();

        assert!(runtime.excluded().is_empty());
        assert_eq!(
            graph.nodes(),
            vec!["tax_rate", "report", "group_sales", "load_sales"]
        );
        assert_eq!(
            graph.transitive_dependency_order("report").unwrap(),
            vec!["tax_rate", "load_sales", "group_sales", "report"]
        );
        assert_eq!(graph.producer_of("df_final"), Some("load_sales"));
        assert!(graph.root_inputs().is_empty());
        assert!(matches!(
            graph.descriptor("group_sales").unwrap().location,
            UnitLocation::Script { .. }
        ));
        assert_eq!(
            graph.descriptor("load_sales").unwrap().produces.len(),
            2
        );
    }

    /// Command units from a TOML config run end to end through `sh`
    #[cfg(unix)]
    #[tokio::test]
    async fn test_shell_pipeline_runs_and_persists() {
        let temp = TempDir::new().unwrap();
        let config = isolated(
            load_and_validate_config("configs/shell-pipeline.toml").unwrap(),
            &temp,
        );

        let runtime = RuntimeBuilder::from_config(&config).unwrap();
        let result = runtime.scheduler().run("count").await.unwrap();
        assert_eq!(result.executed, vec!["extract", "count"]);
        runtime.shutdown().unwrap();

        let runtime = RuntimeBuilder::from_config(&config).unwrap();
        let store = runtime.scheduler().store();
        assert_eq!(store.get("row_count"), Some(serde_json::json!(3)));

        let again = runtime.scheduler().run("count").await.unwrap();
        assert_eq!(again.outcome(), RunOutcome::NothingToDo);
    }

    /// A root input nobody produces stops the run before anything executes
    #[cfg(unix)]
    #[tokio::test]
    async fn test_shell_pipeline_unresolved_root_input() {
        let temp = TempDir::new().unwrap();
        let config = isolated(
            load_and_validate_config("configs/shell-pipeline.toml").unwrap(),
            &temp,
        );
        let runtime = RuntimeBuilder::from_config(&config).unwrap();

        let err = runtime.scheduler().run("publish").await.unwrap_err();

        assert!(matches!(
            err,
            ExecutionError::UnresolvedDependency { ref variable, .. } if variable == "destination"
        ));
        assert!(runtime.scheduler().store().is_empty());
    }

    /// Two config units producing the same variable fail the build
    #[test]
    fn test_ambiguous_config_units_fail_to_build() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("engine.yaml");
        std::fs::write(
            &path,
            r#"
units:
  - name: first
    produces: [x]
    command: ["true"]
  - name: second
    produces: [x]
    command: ["true"]
"#,
        )
        .unwrap();

        let config = load_and_validate_config(&path).unwrap();
        let err = RuntimeBuilder::from_config(&config).unwrap_err();

        assert!(matches!(err, RuntimeError::Graph(_)));
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "ambiguous_producer");
        assert_eq!(json["units"], serde_json::json!(["first", "second"]));
    }
}
