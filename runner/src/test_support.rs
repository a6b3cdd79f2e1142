//! Test-only helpers for building runners and fixtures.

use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};

use crate::core::phase::{Phase, PhaseOutput};

/// Shared record of phase invocations, in call order.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Rc<RefCell<Vec<String>>>,
}

impl CallLog {
    pub fn record(&self, name: &str) {
        self.calls.borrow_mut().push(name.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Return recorded calls and clear the log.
    pub fn take(&self) -> Vec<String> {
        self.calls.borrow_mut().drain(..).collect()
    }
}

/// A passing phase that records its name in `log` and writes
/// `ran_<name> = true`.
pub fn recording_phase(name: &str, log: &CallLog) -> Phase {
    let log = log.clone();
    let phase_name = name.to_string();
    Phase::new(name, move |_| {
        log.record(&phase_name);
        Ok(PhaseOutput::pass().with(format!("ran_{}", phase_name), true))
    })
}

/// Temporary directory holding a config file with `contents`.
pub struct ConfigFixture {
    pub dir: tempfile::TempDir,
    pub path: PathBuf,
}

impl ConfigFixture {
    pub fn new(contents: &str) -> Result<Self> {
        let dir = tempfile::tempdir().context("create tempdir")?;
        let path = dir.path().join(crate::io::config::DEFAULT_CONFIG_FILE);
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
        Ok(Self { dir, path })
    }
}
