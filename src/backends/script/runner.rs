// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::config::consts::{ENV_INPUTS, ENV_OUTPUTS, ENV_UNIT, MAX_STDERR_EXCERPT};
use crate::config::{ScriptsConfig, UnitLocation};
use crate::errors::UnitError;
use crate::observability::messages::unit::ScriptOutput;
use crate::observability::messages::StructuredLog;
use crate::traits::{ExecutionContext, Unit, UnitOutputs};

/// The program scripts are handed to, with its leading arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreter {
    pub program: String,
    pub args: Vec<String>,
}

impl From<&ScriptsConfig> for Interpreter {
    fn from(cfg: &ScriptsConfig) -> Self {
        Self {
            program: cfg.interpreter.clone(),
            args: cfg.interpreter_args.clone(),
        }
    }
}

/// A unit body that runs as a child process.
#[derive(Debug, Clone)]
pub struct ScriptUnit {
    program: String,
    args: Vec<String>,
}

impl ScriptUnit {
    /// Run `path` through `interpreter`.
    pub fn for_script(path: &Path, interpreter: &Interpreter) -> Self {
        let mut args = interpreter.args.clone();
        args.push(path.display().to_string());
        Self {
            program: interpreter.program.clone(),
            args,
        }
    }

    pub fn for_command(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// The body for an out-of-process location. `InProcess` has none.
    pub fn from_location(location: &UnitLocation, interpreter: &Interpreter) -> Option<Self> {
        match location {
            UnitLocation::Script { path } => Some(Self::for_script(path, interpreter)),
            UnitLocation::Command { program, args } => {
                Some(Self::for_command(program.clone(), args.clone()))
            }
            UnitLocation::InProcess => None,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

#[async_trait]
impl Unit for ScriptUnit {
    async fn execute(&self, ctx: ExecutionContext) -> Result<UnitOutputs, UnitError> {
        let workdir = tempfile::TempDir::new().map_err(io_error)?;
        let inputs_path = workdir.path().join("inputs.json");
        let outputs_path = workdir.path().join("outputs.json");

        let inputs = serde_json::to_vec(ctx.inputs()).map_err(|e| UnitError::Io {
            message: format!("failed to encode inputs: {}", e),
        })?;
        tokio::fs::write(&inputs_path, inputs).await.map_err(io_error)?;

        let output = Command::new(&self.program)
            .args(&self.args)
            .env(ENV_UNIT, ctx.unit())
            .env(ENV_INPUTS, &inputs_path)
            .env(ENV_OUTPUTS, &outputs_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| UnitError::Spawn {
                program: self.program.clone(),
                message: e.to_string(),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        for (stream, content) in [("stdout", &stdout), ("stderr", &stderr)] {
            if !content.trim().is_empty() {
                ScriptOutput {
                    unit: ctx.unit(),
                    stream,
                    content: content.trim_end(),
                }
                .log();
            }
        }

        if !output.status.success() {
            return Err(UnitError::NonZeroExit {
                code: output.status.code(),
                stderr: excerpt(&stderr),
            });
        }

        read_outputs(&outputs_path).await
    }

    fn kind(&self) -> &'static str {
        "script"
    }
}

async fn read_outputs(path: &Path) -> Result<UnitOutputs, UnitError> {
    let content = match tokio::fs::read(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(UnitOutputs::new()),
        Err(e) => return Err(io_error(e)),
    };

    match serde_json::from_slice::<Value>(&content) {
        Ok(Value::Object(map)) => Ok(map.into_iter().collect()),
        Ok(other) => Err(UnitError::InvalidOutput {
            message: format!("expected a JSON object, got {}", json_type(&other)),
        }),
        Err(e) => Err(UnitError::InvalidOutput {
            message: e.to_string(),
        }),
    }
}

/// The tail of stderr, where interpreters put the actual error.
fn excerpt(stderr: &str) -> String {
    let text = stderr.trim_end();
    if text.len() <= MAX_STDERR_EXCERPT {
        return text.to_string();
    }
    let mut start = text.len() - MAX_STDERR_EXCERPT;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    format!("...{}", &text[start..])
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn io_error(error: std::io::Error) -> UnitError {
    UnitError::Io {
        message: error.to_string(),
    }
}
