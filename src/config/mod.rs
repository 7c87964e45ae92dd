// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod dependency_graph;
mod descriptor;
mod loader;
mod registry;
mod runtime;
mod unit_map;
mod validation;

#[cfg(test)]
mod integration_tests;
pub mod consts;
pub mod metadata;

pub use dependency_graph::{DependencyGraph, Edge};
pub use descriptor::{is_valid_variable_name, validate_unit_name, UnitDescriptor, UnitLocation};
pub use loader::{
    load_and_validate_config, load_config, validate_config, EngineConfig, ScriptsConfig,
    UnitConfig,
};
pub use metadata::{discover_scripts, parse_markers, scan, ScanOutcome, ScriptSource};
pub use registry::{RegisteredUnit, Registry};
pub use runtime::{Runtime, RuntimeBuilder};
pub use unit_map::UnitMap;
