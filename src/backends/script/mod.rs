// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Out-of-process unit bodies.
//!
//! A script unit runs as a child process and talks to the engine through two
//! JSON files:
//!
//! ```text
//! SCRIPTFLOW_UNIT     name of the unit being run
//! SCRIPTFLOW_INPUTS   path of a JSON object holding the required variables
//! SCRIPTFLOW_OUTPUTS  path the script writes its produced variables to
//! ```
//!
//! The outputs file must hold a JSON object keyed by variable name. A script
//! that writes nothing produces nothing; a non-zero exit is a unit failure.

mod runner;

pub use runner::{Interpreter, ScriptUnit};
