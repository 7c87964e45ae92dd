// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// State file used when the config does not name one
pub const DEFAULT_STATE_FILE: &str = ".scriptflow/state.json";
/// Number of run requests the CLI executes at the same time
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;
/// File extension of discovered scripts, without the dot
pub const DEFAULT_SCRIPT_EXTENSION: &str = "py";
pub const DEFAULT_INTERPRETER: &str = "python3";
/// Longest stderr excerpt carried by a failed script's error
pub const MAX_STDERR_EXCERPT: usize = 4096;

/// Environment variable holding the unit name for script bodies
pub const ENV_UNIT: &str = "SCRIPTFLOW_UNIT";
/// Environment variable holding the path of the JSON inputs file
pub const ENV_INPUTS: &str = "SCRIPTFLOW_INPUTS";
/// Environment variable holding the path the script writes its outputs to
pub const ENV_OUTPUTS: &str = "SCRIPTFLOW_OUTPUTS";
