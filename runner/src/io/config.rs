//! Runner configuration loaded from a TOML file.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::core::context::SharedContext;
use crate::core::range::PhaseRange;

/// Default config file name looked up by the binary.
pub const DEFAULT_CONFIG_FILE: &str = "phase-runner.toml";

/// Runner configuration (TOML).
///
/// Missing fields default to running every phase with `stop_on_fail = true`
/// and an empty seed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunnerConfig {
    /// Stop the run when a phase or hook reports failure.
    pub stop_on_fail: bool,

    /// Phase to start with when the caller does not name one.
    pub start: Option<String>,

    /// Phase to end with (inclusive) when the caller does not name one.
    pub end: Option<String>,

    /// Initial context values for every run.
    pub seed: BTreeMap<String, Value>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            stop_on_fail: true,
            start: None,
            end: None,
            seed: BTreeMap::new(),
        }
    }
}

impl RunnerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.start.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(anyhow!("start must be a non-empty phase name"));
        }
        if self.end.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(anyhow!("end must be a non-empty phase name"));
        }
        if self.seed.keys().any(|key| key.trim().is_empty()) {
            return Err(anyhow!("seed keys must be non-empty"));
        }
        Ok(())
    }

    /// Configured default selection.
    pub fn selection(&self) -> PhaseRange {
        PhaseRange {
            start: self.start.clone(),
            end: self.end.clone(),
        }
    }

    pub fn seed_context(&self) -> SharedContext {
        SharedContext::from(self.seed.clone())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `RunnerConfig::default()`.
pub fn load_config(path: &Path) -> Result<RunnerConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "config file missing, using defaults");
        let cfg = RunnerConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    debug!(path = %path.display(), "loading config");
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: RunnerConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}
