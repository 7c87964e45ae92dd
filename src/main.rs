// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{bail, Context, Result};
use serde_json::json;
use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;

use scriptflow::config::{load_and_validate_config, EngineConfig, Runtime, RuntimeBuilder};
use scriptflow::engine::{RunOutcome, RunResult, UnitStatus};
use scriptflow::errors::ExecutionError;
use scriptflow::observability::init_tracing;

const DEFAULT_CONFIG_FILE: &str = "scriptflow.yaml";

enum Command {
    Run(Vec<String>),
    Plan(String),
    Clear,
    InspectGraph,
    Status,
    Vars,
    Show(String),
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {0} [--config <file>] <command>\n\
         \n\
         Commands:\n\
         \x20 run <unit> [<unit> ...]   run units and everything they depend on\n\
         \x20 plan <unit>               show what a run would execute or skip\n\
         \x20 clear                     forget every stored variable\n\
         \x20 inspect-graph             print units and edges as JSON\n\
         \x20 status                    show which units have all outputs stored\n\
         \x20 vars                      list stored variables and their producers\n\
         \x20 show <variable>           print a stored value as JSON\n\
         \n\
         Example: {0} --config configs/demo.yaml run report",
        program
    )
}

fn parse_args(args: &[String]) -> Result<(Option<PathBuf>, Command)> {
    let mut config = None;
    let mut rest = args.iter().skip(1);
    let mut positional = Vec::new();

    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = rest.next().context("--config needs a file path")?;
                config = Some(PathBuf::from(path));
            }
            _ => positional.push(arg.clone()),
        }
    }

    let Some((command, operands)) = positional.split_first() else {
        bail!("missing command");
    };

    let command = match command.as_str() {
        "run" if !operands.is_empty() => Command::Run(operands.to_vec()),
        "run" => bail!("run needs at least one unit name"),
        "plan" => match operands {
            [unit] => Command::Plan(unit.clone()),
            _ => bail!("plan needs exactly one unit name"),
        },
        "clear" => Command::Clear,
        "inspect-graph" => Command::InspectGraph,
        "status" => Command::Status,
        "vars" => Command::Vars,
        "show" => match operands {
            [variable] => Command::Show(variable.clone()),
            _ => bail!("show needs exactly one variable name"),
        },
        other => bail!("unknown command '{}'", other),
    };

    Ok((config, command))
}

fn load(config_path: Option<&Path>) -> Result<EngineConfig> {
    match config_path {
        Some(path) => Ok(load_and_validate_config(path)?),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            Ok(load_and_validate_config(DEFAULT_CONFIG_FILE)?)
        }
        None => Ok(EngineConfig::default()),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing("info");

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("scriptflow");

    let (config_path, command) = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("❌ {}\n", e);
            eprintln!("{}", usage(program));
            return ExitCode::from(2);
        }
    };

    match execute(config_path.as_deref(), command).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("❌ {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when the command ran but reported failures.
async fn execute(config_path: Option<&Path>, command: Command) -> Result<bool> {
    let config = load(config_path)?;
    let runtime = RuntimeBuilder::from_config(&config).context("failed to assemble engine")?;

    for excluded in runtime.excluded() {
        eprintln!("⚠️  {}", excluded);
    }

    let succeeded = match command {
        Command::Run(targets) => run_targets(&runtime, targets).await,
        Command::Plan(target) => {
            let plan = runtime.scheduler().plan(&target)?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
            true
        }
        Command::Clear => {
            let removed = runtime.scheduler().store().len();
            runtime.scheduler().clear_memory()?;
            println!("🧹 Cleared {} variables", removed);
            true
        }
        Command::InspectGraph => {
            let graph = runtime.scheduler().graph();
            let listing = json!({
                "nodes": graph.descriptors(),
                "edges": graph.edges(),
                "root_inputs": graph.root_inputs(),
            });
            println!("{}", serde_json::to_string_pretty(&listing)?);
            true
        }
        Command::Status => {
            for state in runtime.scheduler().statuses() {
                match state.status {
                    UnitStatus::Ready => println!("✅ {}", state.unit),
                    UnitStatus::Pending if state.missing.is_empty() => {
                        println!("⏳ {} (no declared outputs, always runs)", state.unit)
                    }
                    UnitStatus::Pending => {
                        println!("⏳ {} (missing: {})", state.unit, state.missing.join(", "))
                    }
                }
            }
            true
        }
        Command::Vars => {
            let variables = runtime.scheduler().variables();
            if variables.is_empty() {
                println!("📭 No variables stored");
            }
            for variable in variables {
                match variable.producer {
                    Some(producer) => println!("📦 {} (from {})", variable.name, producer),
                    None => println!("📦 {} (no registered producer)", variable.name),
                }
            }
            true
        }
        Command::Show(name) => match runtime.scheduler().variable(&name) {
            Some(value) => {
                println!("{}", serde_json::to_string_pretty(&value)?);
                true
            }
            None => {
                eprintln!("❌ Variable '{}' is not stored", name);
                false
            }
        },
    };

    runtime.shutdown()?;
    Ok(succeeded)
}

/// Run every target, at most `max_concurrency` at a time, and report each.
async fn run_targets(runtime: &Runtime, targets: Vec<String>) -> bool {
    let semaphore = Arc::new(Semaphore::new(runtime.max_concurrency()));
    let started = Instant::now();

    let mut handles = Vec::with_capacity(targets.len());
    for target in targets {
        let scheduler = runtime.scheduler().clone();
        let semaphore = Arc::clone(&semaphore);
        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            let result = scheduler.run(&target).await;
            (target, result)
        }));
    }

    let mut all_ok = true;
    for handle in handles {
        match handle.await {
            Ok((_, Ok(result))) => report_success(&result),
            Ok((target, Err(error))) => {
                all_ok = false;
                report_failure(&target, &error);
            }
            Err(e) => {
                all_ok = false;
                eprintln!("❌ run task failed: {}", e);
            }
        }
    }

    println!("⏱️  Total time: {:?}", started.elapsed());
    all_ok
}

fn report_success(result: &RunResult) {
    match result.outcome() {
        RunOutcome::NothingToDo => println!(
            "✅ {}: nothing to do ({} units already satisfied)",
            result.target,
            result.skipped.len()
        ),
        RunOutcome::Ran => println!(
            "✅ {}: ran [{}], skipped [{}]",
            result.target,
            result.executed.join(", "),
            result.skipped.join(", ")
        ),
    }
}

fn report_failure(target: &str, error: &ExecutionError) {
    match error.failed_unit() {
        Some(unit) => eprintln!(
            "❌ {}: failed at unit '{}' after running [{}]",
            target,
            unit,
            error.executed().join(", ")
        ),
        None => eprintln!("❌ {}: nothing was run", target),
    }
    match serde_json::to_string(error) {
        Ok(json) => eprintln!("{}", json),
        Err(_) => eprintln!("{}", error),
    }
}
