// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async lock per unit name, shared by every run of a scheduler.
///
/// Holding a unit's guard means no other run is executing that unit's body.
/// Unrelated units never wait on each other.
#[derive(Debug, Clone, Default)]
pub struct UnitGuards {
    guards: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl UnitGuards {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other run holds `unit`, then hold it until the guard drops.
    pub async fn acquire(&self, unit: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut guards = self.guards.lock().await;
            Arc::clone(guards.entry(unit.to_string()).or_default())
        };
        lock.lock_owned().await
    }
}
