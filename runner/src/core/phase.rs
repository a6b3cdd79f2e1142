//! Phase declarations: a named action plus the keys it reads and writes.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::context::SharedContext;

/// Outcome reported by a phase action.
///
/// `Failed` is a soft failure: the action completed but reports that its
/// work did not succeed. Whether it stops the run depends on `stop_on_fail`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseStatus {
    Passed,
    Failed,
}

impl PhaseStatus {
    pub fn is_passed(self) -> bool {
        self == PhaseStatus::Passed
    }
}

impl fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseStatus::Passed => f.write_str("passed"),
            PhaseStatus::Failed => f.write_str("failed"),
        }
    }
}

/// Value returned by a phase action: its status and the keys it writes.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseOutput {
    pub status: PhaseStatus,
    pub updates: SharedContext,
}

impl PhaseOutput {
    /// Passed with no updates.
    pub fn pass() -> Self {
        Self {
            status: PhaseStatus::Passed,
            updates: SharedContext::new(),
        }
    }

    /// Failed with no updates.
    pub fn fail() -> Self {
        Self {
            status: PhaseStatus::Failed,
            updates: SharedContext::new(),
        }
    }

    /// Add an update to be merged into the shared context.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.updates.insert(key, value);
        self
    }
}

impl Default for PhaseOutput {
    fn default() -> Self {
        Self::pass()
    }
}

impl From<SharedContext> for PhaseOutput {
    fn from(updates: SharedContext) -> Self {
        Self {
            status: PhaseStatus::Passed,
            updates,
        }
    }
}

/// Callable invoked with the current shared context.
///
/// Also used for the runner's pre-run and post-run hooks.
pub type Action = Box<dyn Fn(&SharedContext) -> anyhow::Result<PhaseOutput>>;

/// A named unit of work registered with a [`crate::runner::PhaseRunner`].
pub struct Phase {
    name: String,
    action: Action,
    requires: Vec<String>,
    outputs: Vec<String>,
    stop_on_fail: Option<bool>,
}

impl Phase {
    pub fn new<F>(name: impl Into<String>, action: F) -> Self
    where
        F: Fn(&SharedContext) -> anyhow::Result<PhaseOutput> + 'static,
    {
        Self {
            name: name.into(),
            action: Box::new(action),
            requires: Vec::new(),
            outputs: Vec::new(),
            stop_on_fail: None,
        }
    }

    /// Declare keys that must be present before the action runs.
    pub fn requires<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requires.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Declare keys a passing action must write.
    pub fn outputs<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outputs.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Override the runner's `stop_on_fail` for this phase.
    pub fn stop_on_fail(mut self, stop: bool) -> Self {
        self.stop_on_fail = Some(stop);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn required_keys(&self) -> &[String] {
        &self.requires
    }

    pub fn output_keys(&self) -> &[String] {
        &self.outputs
    }

    /// Per-phase override, `None` when inheriting the runner setting.
    pub fn stop_on_fail_override(&self) -> Option<bool> {
        self.stop_on_fail
    }

    /// True if `other` names this phase. Names compare case-insensitively.
    pub fn is_named(&self, other: &str) -> bool {
        names_match(&self.name, other)
    }

    pub(crate) fn invoke(&self, context: &SharedContext) -> anyhow::Result<PhaseOutput> {
        (self.action)(context)
    }
}

impl fmt::Debug for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Phase")
            .field("name", &self.name)
            .field("requires", &self.requires)
            .field("outputs", &self.outputs)
            .field("stop_on_fail", &self.stop_on_fail)
            .finish_non_exhaustive()
    }
}

pub(crate) fn names_match(left: &str, right: &str) -> bool {
    left.to_lowercase() == right.to_lowercase()
}
