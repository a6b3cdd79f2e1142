//! Demo pipeline driven by the `phase-runner` binary.
//!
//! ```text
//! load -> double -> square -> check
//! ```
//!
//! `load` emits `n` (from the context when seeded, else 5). `check` fails
//! softly when `n2_squared` exceeds `limit`, and never stops the run on its
//! own.

use anyhow::bail;
use tracing::info;

use crate::core::phase::{Phase, PhaseOutput};
use crate::error::RunnerError;
use crate::runner::PhaseRunner;

const DEFAULT_N: i64 = 5;
const DEFAULT_LIMIT: i64 = 1_000;

/// Register the demo phases on `runner`.
pub fn register_demo(runner: &mut PhaseRunner) -> Result<(), RunnerError> {
    runner.register(
        Phase::new("load", |ctx| {
            let n = ctx.get_as::<i64>("n")?.unwrap_or(DEFAULT_N);
            info!(n, "loaded starting value");
            Ok(PhaseOutput::pass().with("n", n))
        })
        .outputs(["n"]),
    )?;

    runner.register(
        Phase::new("double", |ctx| {
            let n: i64 = ctx.require_as("n")?;
            let Some(n2) = n.checked_mul(2) else {
                bail!("doubling {} overflows", n);
            };
            Ok(PhaseOutput::pass().with("n2", n2))
        })
        .requires(["n"])
        .outputs(["n2"]),
    )?;

    runner.register(
        Phase::new("square", |ctx| {
            let n2: i64 = ctx.require_as("n2")?;
            let Some(squared) = n2.checked_mul(n2) else {
                bail!("squaring {} overflows", n2);
            };
            Ok(PhaseOutput::pass().with("n2_squared", squared))
        })
        .requires(["n2"])
        .outputs(["n2_squared"]),
    )?;

    runner.register(
        Phase::new("check", |ctx| {
            let squared: i64 = ctx.require_as("n2_squared")?;
            let limit = ctx.get_as::<i64>("limit")?.unwrap_or(DEFAULT_LIMIT);
            let within = squared <= limit;
            let output = if within {
                PhaseOutput::pass()
            } else {
                PhaseOutput::fail()
            };
            Ok(output.with("within_limit", within))
        })
        .requires(["n2_squared"])
        .stop_on_fail(false),
    )?;

    Ok(())
}
