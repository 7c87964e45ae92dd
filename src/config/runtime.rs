// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::backends::script::Interpreter;
use crate::config::{EngineConfig, Registry};
use crate::engine::Scheduler;
use crate::errors::{MalformedMetadataError, RuntimeError, StoreError};
use crate::store::VariableStore;

/// A fully assembled engine: store, graph and scheduler.
#[derive(Debug)]
pub struct Runtime {
    scheduler: Scheduler,
    excluded: Vec<MalformedMetadataError>,
    max_concurrency: usize,
}

impl Runtime {
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Scripts left out of the registry because of malformed metadata.
    pub fn excluded(&self) -> &[MalformedMetadataError] {
        &self.excluded
    }

    /// How many run requests a front end should execute at once.
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Final flush of the variable store.
    pub fn shutdown(self) -> Result<(), StoreError> {
        self.scheduler.store().flush()
    }
}

/// Engine builder - assembles the store, registry, graph and scheduler from
/// configuration.
///
/// # Examples
///
/// ```
/// use scriptflow::config::{EngineConfig, RuntimeBuilder};
///
/// let dir = tempfile::tempdir().unwrap();
/// let config = EngineConfig {
///     state_file: dir.path().join("state.json"),
///     ..EngineConfig::default()
/// };
///
/// let runtime = RuntimeBuilder::from_config(&config).unwrap();
/// assert!(runtime.scheduler().graph().is_empty());
/// ```
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    /// Build an engine from `cfg` alone.
    pub fn from_config(cfg: &EngineConfig) -> Result<Runtime, RuntimeError> {
        Self::from_config_with_registry(cfg, Registry::new())
    }

    /// Build an engine from `cfg`, on top of units already in `registry`.
    ///
    /// Programmatic units come first in declaration order, then the config's
    /// command units, then discovered scripts.
    pub fn from_config_with_registry(
        cfg: &EngineConfig,
        mut registry: Registry,
    ) -> Result<Runtime, RuntimeError> {
        let interpreter = Interpreter::from(&cfg.scripts);

        for unit in &cfg.units {
            registry.register_command(unit)?;
        }
        if let Some(directory) = &cfg.scripts.directory {
            registry.scan_directory(directory, &cfg.scripts.extension, &interpreter)?;
        }

        let store = Arc::new(VariableStore::open(&cfg.state_file)?);
        let scheduler = Scheduler::from_registry(&registry, store)?;

        Ok(Runtime {
            scheduler,
            excluded: registry.excluded().to_vec(),
            max_concurrency: cfg.max_concurrency,
        })
    }
}
