// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::UnitError;
use crate::traits::{ExecutionContext, Unit, UnitOutputs};

/// A unit whose body is a Rust closure.
///
/// Bodies are treated as blocking: each call runs on tokio's blocking pool so
/// a slow computation never stalls the runtime's worker threads.
///
/// # Example
/// ```
/// use scriptflow::backends::local::FnUnit;
/// use scriptflow::traits::{UnitOutputs, Unit};
/// use serde_json::json;
///
/// let unit = FnUnit::new(|ctx| {
///     let x = ctx.require("x")?.as_i64().unwrap_or_default();
///     Ok(UnitOutputs::from([("y".to_string(), json!(x * 2))]))
/// });
/// assert_eq!(unit.kind(), "fn");
/// ```
pub struct FnUnit<F> {
    body: Arc<F>,
}

impl<F> FnUnit<F>
where
    F: Fn(&ExecutionContext) -> Result<UnitOutputs, UnitError> + Send + Sync + 'static,
{
    pub fn new(body: F) -> Self {
        Self {
            body: Arc::new(body),
        }
    }
}

#[async_trait]
impl<F> Unit for FnUnit<F>
where
    F: Fn(&ExecutionContext) -> Result<UnitOutputs, UnitError> + Send + Sync + 'static,
{
    async fn execute(&self, ctx: ExecutionContext) -> Result<UnitOutputs, UnitError> {
        let body = Arc::clone(&self.body);
        tokio::task::spawn_blocking(move || body(&ctx)).await?
    }

    fn kind(&self) -> &'static str {
        "fn"
    }
}
