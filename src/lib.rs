// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // unit body backends
pub mod config;     // config, metadata registry, dependency graph
pub mod engine;     // execution scheduler
pub mod errors;     // error handling
pub mod observability;
pub mod store;      // persisted variable store
pub mod traits;     // unified abstractions
