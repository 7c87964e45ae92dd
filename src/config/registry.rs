// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The metadata registry: the set of known units and their bodies.
//!
//! Units arrive from three places, all converging on the same
//! [`UnitDescriptor`] shape:
//!
//! - scanning script files for comment markers ([`Registry::scan_directory`])
//! - explicit command units from the engine config ([`Registry::register_command`])
//! - Rust code ([`Registry::register`] and [`Registry::register_fn`])
//!
//! The registry never executes anything and never touches the variable store.
//! It keeps declaration order, which the dependency graph uses to break ties.

use std::path::Path;
use std::sync::Arc;

use crate::backends::local::FnUnit;
use crate::backends::script::{Interpreter, ScriptUnit};
use crate::config::metadata::{discover_scripts, scan, ScanOutcome};
use crate::config::{DependencyGraph, UnitConfig, UnitDescriptor, UnitLocation, UnitMap};
use crate::errors::{ConfigError, GraphError, MalformedMetadataError, MetadataIssue, UnitError};
use crate::observability::messages::validation::MalformedUnitExcluded;
use crate::observability::messages::StructuredLog;
use crate::traits::{ExecutionContext, Unit, UnitOutputs};

/// A descriptor together with the body that implements it.
#[derive(Clone)]
pub struct RegisteredUnit {
    pub descriptor: UnitDescriptor,
    pub body: Arc<dyn Unit>,
}

impl std::fmt::Debug for RegisteredUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredUnit")
            .field("descriptor", &self.descriptor)
            .field("kind", &self.body.kind())
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    units: Vec<RegisteredUnit>,
    excluded: Vec<MalformedMetadataError>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a unit from code.
    ///
    /// # Example
    /// ```
    /// use std::sync::Arc;
    /// use scriptflow::backends::local::FnUnit;
    /// use scriptflow::config::Registry;
    /// use scriptflow::traits::UnitOutputs;
    ///
    /// let mut registry = Registry::new();
    /// registry
    ///     .register("load", ["x"], Vec::<String>::new(), Arc::new(FnUnit::new(|_| Ok(UnitOutputs::new()))))
    ///     .unwrap();
    ///
    /// assert_eq!(registry.len(), 1);
    /// ```
    pub fn register<P, C>(
        &mut self,
        name: impl Into<String>,
        produces: P,
        consumes: C,
        body: Arc<dyn Unit>,
    ) -> Result<&UnitDescriptor, MalformedMetadataError>
    where
        P: IntoIterator,
        P::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let descriptor = UnitDescriptor::new(name, consumes, produces, UnitLocation::InProcess)?;
        Ok(self.push(descriptor, body))
    }

    /// Register a closure as a unit body.
    pub fn register_fn<P, C, F>(
        &mut self,
        name: impl Into<String>,
        produces: P,
        consumes: C,
        body: F,
    ) -> Result<&UnitDescriptor, MalformedMetadataError>
    where
        P: IntoIterator,
        P::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
        F: Fn(&ExecutionContext) -> Result<UnitOutputs, UnitError> + Send + Sync + 'static,
    {
        self.register(name, produces, consumes, Arc::new(FnUnit::new(body)))
    }

    /// Register an already validated descriptor with its body.
    pub fn register_descriptor(
        &mut self,
        descriptor: UnitDescriptor,
        body: Arc<dyn Unit>,
    ) -> &UnitDescriptor {
        self.push(descriptor, body)
    }

    /// Register a unit declared in the engine config.
    pub fn register_command(
        &mut self,
        unit: &UnitConfig,
    ) -> Result<&UnitDescriptor, MalformedMetadataError> {
        let (program, args) = match unit.command.split_first() {
            Some((program, args)) => (program.clone(), args.to_vec()),
            None => (String::new(), Vec::new()),
        };

        let mut descriptor = UnitDescriptor::new(
            unit.name.clone(),
            unit.requires.iter().cloned(),
            unit.produces.iter().cloned(),
            UnitLocation::Command {
                program: program.clone(),
                args: args.clone(),
            },
        )?;
        if let Some(description) = &unit.description {
            descriptor = descriptor.with_description(description.clone());
        }

        Ok(self.push(descriptor, Arc::new(ScriptUnit::for_command(program, args))))
    }

    /// Add the result of a scan, giving every script a process body.
    ///
    /// Malformed units are logged and remembered in [`excluded`](Self::excluded).
    /// Returns how many units were registered.
    pub fn register_scan(&mut self, outcome: ScanOutcome, interpreter: &Interpreter) -> usize {
        for error in outcome.errors {
            self.exclude(error);
        }

        let mut registered = 0;
        for descriptor in outcome.descriptors {
            let Some(body) = ScriptUnit::from_location(&descriptor.location, interpreter) else {
                self.exclude(MalformedMetadataError::new(
                    descriptor.name,
                    MetadataIssue::NoExecutableBody {
                        location: "in_process".to_string(),
                    },
                ));
                continue;
            };
            self.push(descriptor, Arc::new(body));
            registered += 1;
        }
        registered
    }

    /// Discover, parse and register every script under `directory`.
    pub fn scan_directory(
        &mut self,
        directory: &Path,
        extension: &str,
        interpreter: &Interpreter,
    ) -> Result<usize, ConfigError> {
        let (sources, unreadable) = discover_scripts(directory, extension)?;
        for error in unreadable {
            self.exclude(error);
        }
        Ok(self.register_scan(scan(&sources), interpreter))
    }

    /// Descriptors in declaration order.
    pub fn descriptors(&self) -> Vec<UnitDescriptor> {
        self.units.iter().map(|u| u.descriptor.clone()).collect()
    }

    pub fn units(&self) -> &[RegisteredUnit] {
        &self.units
    }

    /// Units left out because their metadata was malformed or unreadable.
    pub fn excluded(&self) -> &[MalformedMetadataError] {
        &self.excluded
    }

    pub fn unit_map(&self) -> UnitMap {
        let mut map = UnitMap::new();
        for unit in &self.units {
            map.insert(unit.descriptor.name.clone(), Arc::clone(&unit.body));
        }
        map
    }

    /// Validate the registered descriptors and build a fresh graph.
    pub fn build_graph(&self) -> Result<DependencyGraph, GraphError> {
        DependencyGraph::build(&self.descriptors())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.units.iter().any(|u| u.descriptor.name == name)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    fn push(&mut self, descriptor: UnitDescriptor, body: Arc<dyn Unit>) -> &UnitDescriptor {
        self.units.push(RegisteredUnit { descriptor, body });
        &self.units[self.units.len() - 1].descriptor
    }

    fn exclude(&mut self, error: MalformedMetadataError) {
        MalformedUnitExcluded { error: &error }.log();
        self.excluded.push(error);
    }
}
