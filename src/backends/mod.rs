// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Unit body backends.
//!
//! Every backend implements the [`Unit`](crate::traits::Unit) trait; the
//! scheduler does not know or care which one it is calling.
//!
//! # Available Backends
//!
//! ## Local Backend
//! In-process Rust closures ([`local::FnUnit`]), run on tokio's blocking pool.
//! Used when embedding the engine and for programmatic registration.
//!
//! ## Script Backend
//! Child processes ([`script::ScriptUnit`]): discovered scripts run through the
//! configured interpreter, or explicit commands from the config file. Inputs
//! and outputs travel as JSON files.
//!
//! ## Stub Backend (Test-Only)
//! - **StubUnit**: fixed outputs, call counting, optional delay
//! - **FailingUnit**: always returns an error
//! - **PanickingUnit**: panics inside its body
//!
//! # Examples
//!
//! ```rust
//! use scriptflow::backends::script::ScriptUnit;
//! use scriptflow::traits::Unit;
//!
//! let unit = ScriptUnit::for_command("sh", vec!["-c".to_string(), "true".to_string()]);
//! assert_eq!(unit.kind(), "script");
//! ```

pub mod local;
pub mod script;
#[cfg(test)]
pub mod stub;
