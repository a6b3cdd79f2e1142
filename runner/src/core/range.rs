//! Selection of a contiguous, inclusive sub-range of phases by name.

use std::fmt;
use std::ops::RangeInclusive;

use crate::core::phase::Phase;
use crate::error::RunnerError;

/// Which end of a range a phase name was supplied for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Start,
    End,
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Start => f.write_str("start"),
            Bound::End => f.write_str("end"),
        }
    }
}

/// Optional start and end phase names. Both ends are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl PhaseRange {
    /// Every registered phase.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(start: Option<&str>, end: Option<&str>) -> Self {
        Self {
            start: start.map(str::to_string),
            end: end.map(str::to_string),
        }
    }

    /// Exactly one phase.
    pub fn exact(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            start: Some(name.clone()),
            end: Some(name),
        }
    }

    /// Fill unset bounds from `fallback`.
    pub fn or(self, fallback: PhaseRange) -> Self {
        Self {
            start: self.start.or(fallback.start),
            end: self.end.or(fallback.end),
        }
    }

    pub fn is_all(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Resolve bounds to indices into `phases`.
    ///
    /// Returns `Ok(None)` when there is nothing to run (no phases and no
    /// bounds). A bound that names no phase is `UnknownPhase`; a start after
    /// its end is `InvalidRange`.
    pub fn resolve(&self, phases: &[Phase]) -> Result<Option<RangeInclusive<usize>>, RunnerError> {
        let start = match &self.start {
            Some(name) => Some(find_index(phases, name, Bound::Start)?),
            None => None,
        };
        let end = match &self.end {
            Some(name) => Some(find_index(phases, name, Bound::End)?),
            None => None,
        };

        if phases.is_empty() {
            return Ok(None);
        }

        let start = start.unwrap_or(0);
        let end = end.unwrap_or(phases.len() - 1);
        if start > end {
            return Err(RunnerError::InvalidRange {
                start: phases[start].name().to_string(),
                end: phases[end].name().to_string(),
            });
        }
        Ok(Some(start..=end))
    }
}

fn find_index(phases: &[Phase], name: &str, bound: Bound) -> Result<usize, RunnerError> {
    phases
        .iter()
        .position(|phase| phase.is_named(name))
        .ok_or_else(|| RunnerError::UnknownPhase {
            bound,
            name: name.to_string(),
            known: phases.iter().map(|phase| phase.name().to_string()).collect(),
        })
}
