// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::errors::UnitError;
use crate::traits::{ExecutionContext, Unit, UnitOutputs, Variables};

/// A unit that returns fixed outputs and records how it was called.
///
/// Clones share their counters, so a test can keep one handle and give the
/// other to the registry.
#[derive(Clone, Default)]
pub struct StubUnit {
    outputs: UnitOutputs,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
    running: Arc<AtomicUsize>,
    max_running: Arc<AtomicUsize>,
    seen_inputs: Arc<Mutex<Vec<Variables>>>,
}

impl StubUnit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn producing<I, K>(outputs: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self {
            outputs: outputs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            ..Self::default()
        }
    }

    /// Sleep this long inside every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of calls that were in flight at the same time.
    pub fn max_concurrent(&self) -> usize {
        self.max_running.load(Ordering::SeqCst)
    }

    pub fn seen_inputs(&self) -> Vec<Variables> {
        self.seen_inputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl Unit for StubUnit {
    async fn execute(&self, ctx: ExecutionContext) -> Result<UnitOutputs, UnitError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now_running = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_running.fetch_max(now_running, Ordering::SeqCst);
        self.seen_inputs.lock().unwrap().push(ctx.into_inputs());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.running.fetch_sub(1, Ordering::SeqCst);
        Ok(self.outputs.clone())
    }

    fn kind(&self) -> &'static str {
        "stub"
    }
}

/// A unit that always fails.
pub struct FailingUnit {
    pub message: String,
}

impl FailingUnit {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl Unit for FailingUnit {
    async fn execute(&self, _ctx: ExecutionContext) -> Result<UnitOutputs, UnitError> {
        Err(UnitError::failed(self.message.clone()))
    }

    fn kind(&self) -> &'static str {
        "failing"
    }
}

/// A unit whose body panics.
pub struct PanickingUnit;

#[async_trait]
impl Unit for PanickingUnit {
    async fn execute(&self, _ctx: ExecutionContext) -> Result<UnitOutputs, UnitError> {
        panic!("simulated unit panic")
    }

    fn kind(&self) -> &'static str {
        "panicking"
    }
}
