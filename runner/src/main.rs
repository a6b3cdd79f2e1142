//! Run the demo phase pipeline, optionally restricted to a range of phases.
//!
//! Prints the final shared context as JSON on stdout. Logs go to stderr.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;

use phase_runner::cli::{SelectionArgs, context_from_pairs, parse_key_value};
use phase_runner::demo::register_demo;
use phase_runner::error::RunnerError;
use phase_runner::exit_codes;
use phase_runner::io::config::{DEFAULT_CONFIG_FILE, load_config};
use phase_runner::logging;
use phase_runner::runner::PhaseRunner;

#[derive(Parser)]
#[command(
    name = "phase-runner",
    version,
    about = "Run named phases in order, sharing one key-value context"
)]
struct Cli {
    /// TOML config file (stop_on_fail, default start/end, [seed]).
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(flatten)]
    selection: SelectionArgs,

    /// Seed a context value; VALUE is parsed as JSON, else taken as a string.
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    set: Vec<(String, Value)>,

    /// Keep going after a phase reports failure.
    #[arg(long)]
    keep_going: bool,

    /// Print phase names in execution order and exit.
    #[arg(long)]
    list: bool,
}

fn main() {
    logging::init("warn");
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // Help and version go to stdout and exit 0.
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => {
            let _ = err.print();
            std::process::exit(exit_codes::INVALID);
        }
    };
    let code = match run(cli) {
        Ok(()) => exit_codes::OK,
        Err(err) => {
            eprintln!("{:#}", err);
            exit_code_for(&err)
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli.config)?;

    let mut runner = PhaseRunner::from_config(&config);
    if cli.keep_going {
        runner.set_stop_on_fail(false);
    }
    register_demo(&mut runner).context("register demo phases")?;

    if cli.list {
        for name in runner.phase_names() {
            println!("{}", name);
        }
        return Ok(());
    }

    let initial = context_from_pairs(cli.set);
    let report = runner.run_range(&cli.selection.range(), Some(initial))?;
    println!("{}", report.context.to_json_pretty()?);
    Ok(())
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<RunnerError>() {
        Some(runner_err) if runner_err.is_selection_error() => exit_codes::INVALID,
        Some(RunnerError::DuplicateName { .. }) => exit_codes::INVALID,
        Some(_) => exit_codes::FAILED,
        None => exit_codes::INVALID,
    }
}
