// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::traits::Unit;
use std::collections::HashMap;
use std::sync::Arc;

/// Maps unit names to their executable bodies.
///
/// Bodies are held as `Arc<dyn Unit>` so concurrent runs can share them
/// without cloning. The scheduler looks bodies up here by the names the
/// dependency graph hands it.
#[derive(Clone, Default)]
pub struct UnitMap(pub HashMap<String, Arc<dyn Unit>>);

impl UnitMap {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn insert(&mut self, name: String, unit: Arc<dyn Unit>) {
        self.0.insert(name, unit);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Unit>> {
        self.0.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for UnitMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.0.keys().collect();
        names.sort();
        f.debug_struct("UnitMap")
            .field("unit_count", &self.0.len())
            .field("unit_names", &names)
            .finish()
    }
}

impl From<HashMap<String, Arc<dyn Unit>>> for UnitMap {
    fn from(map: HashMap<String, Arc<dyn Unit>>) -> Self {
        Self(map)
    }
}
