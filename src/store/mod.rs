// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Persisted variable store.
//!
//! The store maps variable names to arbitrary JSON values and is the single
//! source of truth for what has already been computed. Every mutation is
//! written through to the state file before it becomes visible in memory.

mod persistence;
mod snapshot;
mod variable_store;

pub use persistence::STATE_FILE_VERSION;
pub use snapshot::StoreSnapshot;
pub use variable_store::VariableStore;
