// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::persistence;
use super::StoreSnapshot;
use crate::errors::StoreError;
use crate::observability::messages::store::{StoreCleared, StoreOpened, StorePersisted};
use crate::observability::messages::StructuredLog;

#[derive(Debug, Default)]
struct StoreState {
    variables: Arc<BTreeMap<String, Value>>,
    /// Bumped on every `clear_all` so in-flight runs can detect it
    generation: u64,
}

/// Persisted mapping from variable name to value.
///
/// Every mutation is applied to a copy of the current map, written through to
/// the state file, and only then swapped in. Memory and disk therefore never
/// disagree, and a failed write leaves the previous contents in place.
///
/// The store is shared between concurrent runs behind an `Arc`; all methods
/// take `&self`.
#[derive(Debug)]
pub struct VariableStore {
    path: Option<PathBuf>,
    state: RwLock<StoreState>,
}

impl VariableStore {
    /// Open the store backed by `path`, loading any previous session's state.
    ///
    /// A missing file is an empty store. The file is created on first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let variables = persistence::load(&path)?;

        let display = path.display().to_string();
        StoreOpened {
            path: Some(&display),
            variable_count: variables.len(),
        }
        .log();

        Ok(Self {
            path: Some(path),
            state: RwLock::new(StoreState {
                variables: Arc::new(variables),
                generation: 0,
            }),
        })
    }

    /// A store that lives only as long as the process.
    pub fn in_memory() -> Self {
        StoreOpened {
            path: None,
            variable_count: 0,
        }
        .log();

        Self {
            path: None,
            state: RwLock::new(StoreState::default()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.read().variables.get(name).cloned()
    }

    pub fn has(&self, name: &str) -> bool {
        self.read().variables.contains_key(name)
    }

    /// Insert or overwrite a single variable.
    pub fn put(&self, name: impl Into<String>, value: Value) -> Result<(), StoreError> {
        self.put_batch(BTreeMap::from([(name.into(), value)]))
            .map(|_| ())
    }

    /// Insert or overwrite several variables as one atomic write.
    ///
    /// Either all of `batch` becomes visible and durable, or none of it does.
    /// Returns the number of variables whose value actually changed.
    pub fn put_batch(&self, batch: BTreeMap<String, Value>) -> Result<usize, StoreError> {
        let mut state = self.write();
        self.apply(&mut state, batch)
    }

    /// Like [`put_batch`](Self::put_batch), but only while the store is still
    /// in `generation`.
    ///
    /// Returns `Ok(None)` without writing anything when the store has been
    /// cleared since, so results computed from pre-clear values never land
    /// in the cleared store.
    pub fn put_batch_in_generation(
        &self,
        batch: BTreeMap<String, Value>,
        generation: u64,
    ) -> Result<Option<usize>, StoreError> {
        let mut state = self.write();
        if state.generation != generation {
            return Ok(None);
        }
        self.apply(&mut state, batch).map(Some)
    }

    /// Remove every variable, in memory and on disk.
    ///
    /// Snapshots taken before the clear stop being current; runs holding one
    /// will stop before their next unit.
    pub fn clear_all(&self) -> Result<(), StoreError> {
        let mut state = self.write();
        let removed = state.variables.len();
        let empty = BTreeMap::new();

        self.persist(&empty, removed)?;
        state.variables = Arc::new(empty);
        state.generation += 1;

        StoreCleared {
            removed,
            generation: state.generation,
        }
        .log();
        Ok(())
    }

    /// A consistent read-only view of the current contents.
    pub fn snapshot(&self) -> StoreSnapshot {
        let state = self.read();
        StoreSnapshot {
            variables: Arc::clone(&state.variables),
            generation: state.generation,
        }
    }

    pub fn generation(&self) -> u64 {
        self.read().generation
    }

    /// Variable names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.read().variables.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().variables.is_empty()
    }

    /// Rewrite the state file from memory. Used on shutdown.
    pub fn flush(&self) -> Result<(), StoreError> {
        let state = self.read();
        self.persist(&state.variables, 0)
    }

    fn apply(
        &self,
        state: &mut StoreState,
        batch: BTreeMap<String, Value>,
    ) -> Result<usize, StoreError> {
        if batch.is_empty() {
            return Ok(0);
        }

        let mut next = (*state.variables).clone();
        let mut changed = 0;
        for (name, value) in batch {
            if next.get(&name) != Some(&value) {
                changed += 1;
            }
            next.insert(name, value);
        }

        self.persist(&next, changed)?;
        state.variables = Arc::new(next);
        Ok(changed)
    }

    fn persist(&self, variables: &BTreeMap<String, Value>, changed: usize) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        persistence::save(path, variables)?;
        StorePersisted {
            path: &path.display().to_string(),
            variable_count: variables.len(),
            changed,
        }
        .log();
        Ok(())
    }

    // A panic can only happen before the swap, so a poisoned lock still guards
    // a map that matches the state file.
    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
