//! Error taxonomy for registering and running phases.

use std::fmt;

use thiserror::Error;

use crate::core::range::Bound;

/// Which runner hook produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    PreRun,
    PostRun,
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hook::PreRun => f.write_str("pre-run"),
            Hook::PostRun => f.write_str("post-run"),
        }
    }
}

/// Errors surfaced by [`crate::runner::PhaseRunner`].
///
/// Nothing is retried or recovered internally. Selection errors are raised
/// before any phase or hook runs.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// `add_phase`/`register` with a name already in the list.
    #[error("phase '{name}' already exists in runner")]
    DuplicateName { name: String },

    /// A start or end name did not resolve to a registered phase.
    #[error("{bound} phase '{name}' not in phases: {}", .known.join(", "))]
    UnknownPhase {
        bound: Bound,
        name: String,
        known: Vec<String>,
    },

    /// The resolved start comes after the resolved end.
    #[error("start phase '{start}' must come before end phase '{end}'")]
    InvalidRange { start: String, end: String },

    /// A phase read a key that no earlier phase or the initial context set.
    #[error("phase '{phase}' is missing required keys: {}", .keys.join(", "))]
    MissingParameter { phase: String, keys: Vec<String> },

    /// A passing phase did not write every key it declared as output.
    #[error("phase '{phase}' did not produce declared outputs: {}", .keys.join(", "))]
    MissingOutput { phase: String, keys: Vec<String> },

    /// A phase action returned an error.
    #[error("phase '{phase}' failed")]
    PhaseFailed {
        phase: String,
        #[source]
        source: anyhow::Error,
    },

    /// A phase reported failure and `stop_on_fail` applied to it.
    #[error("phase '{phase}' failed and stop_on_fail is set")]
    Stopped { phase: String },

    /// A hook returned an error.
    #[error("{hook} hook failed")]
    HookFailed {
        hook: Hook,
        #[source]
        source: anyhow::Error,
    },

    /// A hook reported failure and the runner has `stop_on_fail` set.
    #[error("{hook} hook failed and stop_on_fail is set")]
    HookStopped { hook: Hook },
}

impl RunnerError {
    /// True for errors raised before the run began (bad start/end names).
    pub fn is_selection_error(&self) -> bool {
        matches!(
            self,
            RunnerError::UnknownPhase { .. } | RunnerError::InvalidRange { .. }
        )
    }
}
