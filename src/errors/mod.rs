// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structured error types for every stage of the engine.
//!
//! Each error serializes to a JSON object tagged with a `kind` field so that
//! front ends can render failures without parsing message text.

mod config;
mod execution;
mod graph;
mod metadata;
mod runtime;
mod store;

pub use config::ConfigError;
pub use execution::{ExecutionError, UnitError};
pub use graph::GraphError;
pub use metadata::{MalformedMetadataError, MetadataIssue};
pub use runtime::RuntimeError;
pub use store::StoreError;
