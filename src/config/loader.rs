// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::consts::{
    DEFAULT_INTERPRETER, DEFAULT_MAX_CONCURRENCY, DEFAULT_SCRIPT_EXTENSION, DEFAULT_STATE_FILE,
};
use crate::errors::ConfigError;

/// Engine configuration, read from YAML or TOML.
///
/// Every field is optional; an empty file yields a usable in-process engine
/// with the default state file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub state_file: PathBuf,
    pub max_concurrency: usize,
    pub scripts: ScriptsConfig,
    pub units: Vec<UnitConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            state_file: PathBuf::from(DEFAULT_STATE_FILE),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            scripts: ScriptsConfig::default(),
            units: Vec::new(),
        }
    }
}

/// Where to discover scripts and how to run them.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ScriptsConfig {
    /// Directory scanned recursively; no scan happens when unset
    pub directory: Option<PathBuf>,
    pub extension: String,
    pub interpreter: String,
    pub interpreter_args: Vec<String>,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            directory: None,
            extension: DEFAULT_SCRIPT_EXTENSION.to_string(),
            interpreter: DEFAULT_INTERPRETER.to_string(),
            interpreter_args: Vec::new(),
        }
    }
}

/// A unit declared directly in the config, backed by an explicit command.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct UnitConfig {
    pub name: String,
    #[serde(default)]
    pub requires: Vec<String>,
    #[serde(default)]
    pub produces: Vec<String>,
    /// Program followed by its arguments
    pub command: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Read a config file, choosing the format by extension.
///
/// Relative paths inside the file (`state_file`, `scripts.directory`) are
/// resolved against the directory holding the config.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ConfigError> {
    let path = path.as_ref();
    let display = path.display().to_string();

    let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: display.clone(),
        message: e.to_string(),
    })?;

    let parse_error = |message: String| ConfigError::Parse {
        path: display.clone(),
        message,
    };

    let mut cfg: EngineConfig = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") if content.trim().is_empty() => EngineConfig::default(),
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str(&content).map_err(|e| parse_error(e.to_string()))?
        }
        Some("toml") => toml::from_str(&content).map_err(|e| parse_error(e.to_string()))?,
        _ => return Err(ConfigError::UnsupportedFormat { path: display }),
    };

    if let Some(base) = path.parent() {
        cfg.state_file = resolve(base, &cfg.state_file);
        cfg.scripts.directory = cfg.scripts.directory.map(|dir| resolve(base, &dir));
    }

    Ok(cfg)
}

/// Load a config and reject values the engine cannot run with.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ConfigError> {
    let cfg = load_config(path)?;
    validate_config(&cfg)?;
    Ok(cfg)
}

pub fn validate_config(cfg: &EngineConfig) -> Result<(), ConfigError> {
    let invalid = |field: &str, message: &str| ConfigError::Invalid {
        field: field.to_string(),
        message: message.to_string(),
    };

    if cfg.max_concurrency == 0 {
        return Err(invalid("max_concurrency", "must be greater than zero"));
    }
    if cfg.scripts.interpreter.trim().is_empty() {
        return Err(invalid("scripts.interpreter", "must not be empty"));
    }
    if cfg.scripts.extension.trim().is_empty() {
        return Err(invalid("scripts.extension", "must not be empty"));
    }
    if cfg.scripts.extension.starts_with('.') {
        return Err(invalid("scripts.extension", "must not start with '.'"));
    }
    for unit in &cfg.units {
        if unit.command.first().map_or(true, |program| program.trim().is_empty()) {
            return Err(ConfigError::Invalid {
                field: format!("units.{}.command", unit.name),
                message: "must name a program to run".to_string(),
            });
        }
    }

    Ok(())
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() || base.as_os_str().is_empty() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
