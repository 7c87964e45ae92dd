// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::VariableStore;

/// A point-in-time, read-only view of the store.
///
/// Cheap to take: it shares the map the store held when it was taken. Later
/// writes swap in a new map and never touch this one.
#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    pub(super) variables: Arc<BTreeMap<String, Value>>,
    pub(super) generation: u64,
}

impl StoreSnapshot {
    pub fn has(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// True when every name in `names` is present.
    pub fn has_all<'a, I>(&self, names: I) -> bool
    where
        I: IntoIterator<Item = &'a String>,
    {
        names.into_iter().all(|name| self.has(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// The clear generation this snapshot was taken in.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// False once `store` has been cleared after this snapshot was taken.
    pub fn is_current(&self, store: &VariableStore) -> bool {
        self.generation == store.generation()
    }
}
