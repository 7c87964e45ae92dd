// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Messages are organized by subsystem:
//!
//! * `engine` - run lifecycle, planning and skip decisions
//! * `unit` - unit body execution
//! * `validation` - metadata and graph validation
//! * `store` - variable store persistence

pub mod engine;
pub mod store;
pub mod unit;
pub mod validation;

use std::fmt::Display;
use tracing::Span;

/// A message that knows how to emit itself as a structured `tracing` event.
pub trait StructuredLog: Display {
    /// Emit the event at the message's level with its fields attached.
    fn log(&self);

    /// Open a span carrying the message's fields.
    fn span(&self, name: &str) -> Span {
        tracing::info_span!("scriptflow", span_name = name)
    }
}
