use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::errors::UnitError;

/// Variable name to value mapping used for unit inputs and outputs.
pub type Variables = BTreeMap<String, Value>;

/// Values a unit body hands back, keyed by variable name.
pub type UnitOutputs = Variables;

/// The capability-scoped environment a unit body runs in.
///
/// Holds exactly the variables the unit declared as required, read from the
/// store right before execution. Nothing else is visible to the body.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionContext {
    unit: String,
    inputs: Variables,
}

impl ExecutionContext {
    pub fn new(unit: impl Into<String>, inputs: Variables) -> Self {
        Self {
            unit: unit.into(),
            inputs,
        }
    }

    /// Name of the unit being executed
    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.inputs.get(name)
    }

    /// Like [`get`](Self::get) but turns an absent input into a unit failure.
    pub fn require(&self, name: &str) -> Result<&Value, UnitError> {
        self.inputs
            .get(name)
            .ok_or_else(|| UnitError::failed(format!("input variable '{}' is not available", name)))
    }

    pub fn inputs(&self) -> &Variables {
        &self.inputs
    }

    pub fn into_inputs(self) -> Variables {
        self.inputs
    }
}

/// An executable unit body.
///
/// The engine treats bodies as opaque: it passes the declared inputs in an
/// [`ExecutionContext`] and captures whatever declared outputs come back.
#[async_trait]
pub trait Unit: Send + Sync {
    async fn execute(&self, ctx: ExecutionContext) -> Result<UnitOutputs, UnitError>;

    /// Short label for the backend kind, used in logs and graph listings.
    fn kind(&self) -> &'static str;
}
