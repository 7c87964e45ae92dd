// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! All diagnostic and operational logging in the engine goes through the
//! message types in [`messages`]. Each message is a small struct with a
//! `Display` implementation and a [`messages::StructuredLog`] implementation
//! that emits the event with structured fields, so engine code never builds
//! log strings inline.
//!
//! # Usage
//!
//! ```rust
//! use scriptflow::observability::messages::{unit::UnitExecutionStarted, StructuredLog};
//!
//! let msg = UnitExecutionStarted {
//!     unit: "load_sales",
//!     input_count: 2,
//! };
//!
//! let span = msg.span("unit_execution");
//! let _guard = span.enter();
//! msg.log();
//! ```

pub mod messages;

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// Filtering follows `RUST_LOG` and falls back to `default_filter` when the
/// variable is unset or invalid. Calling this twice is harmless; the second
/// call leaves the first subscriber in place.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
