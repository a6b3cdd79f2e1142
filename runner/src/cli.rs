//! Command-line selection of phases, shared by binaries that embed a runner.

use anyhow::{Result, anyhow};
use clap::Args;
use serde_json::Value;

use crate::core::context::SharedContext;
use crate::core::range::PhaseRange;

/// Optional phase selection flags.
///
/// `--startwith`/`--endwith` pick an inclusive range; `--exact` picks a
/// single phase and cannot be combined with either.
#[derive(Debug, Clone, Default, Args)]
#[command(next_help_heading = "Phase Selection")]
pub struct SelectionArgs {
    /// Phase to start with.
    #[arg(short = 's', long, value_name = "PHASE")]
    pub startwith: Option<String>,

    /// Phase to end with (inclusive).
    #[arg(short = 'e', long, value_name = "PHASE")]
    pub endwith: Option<String>,

    /// The only phase to run.
    #[arg(
        short = 'x',
        long,
        value_name = "PHASE",
        conflicts_with_all = ["startwith", "endwith"]
    )]
    pub exact: Option<String>,
}

impl SelectionArgs {
    pub fn range(&self) -> PhaseRange {
        match &self.exact {
            Some(name) => PhaseRange::exact(name.clone()),
            None => PhaseRange {
                start: self.startwith.clone(),
                end: self.endwith.clone(),
            },
        }
    }
}

/// Parse `KEY=VALUE`. The value is read as JSON when it parses, otherwise
/// kept as a plain string.
pub fn parse_key_value(raw: &str) -> Result<(String, Value)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected KEY=VALUE, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(anyhow!("empty key in '{}'", raw));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

/// Collect `--set` pairs into a context. Later pairs win.
pub fn context_from_pairs(pairs: Vec<(String, Value)>) -> SharedContext {
    pairs.into_iter().collect()
}
