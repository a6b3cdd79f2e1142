//! Registration and sequential execution of named phases.

use tracing::{debug, error, info, info_span, warn};

use crate::core::context::{MissingKey, SharedContext};
use crate::core::phase::{Action, Phase, PhaseOutput, PhaseStatus, names_match};
use crate::core::range::PhaseRange;
use crate::error::{Hook, RunnerError};
use crate::io::config::RunnerConfig;

/// Status of one executed phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseRecord {
    pub name: String,
    pub status: PhaseStatus,
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Final shared context after the last executed phase and hooks.
    pub context: SharedContext,
    /// Executed phases in execution order.
    pub phases: Vec<PhaseRecord>,
}

impl RunReport {
    /// True if every executed phase passed.
    pub fn all_passed(&self) -> bool {
        self.phases.iter().all(|record| record.status.is_passed())
    }

    pub fn failed(&self) -> impl Iterator<Item = &PhaseRecord> {
        self.phases
            .iter()
            .filter(|record| !record.status.is_passed())
    }
}

/// Ordered list of named phases sharing one context per run.
///
/// Owners build a runner by composition: construct it, then register their
/// phases (usually closures capturing whatever state they need).
pub struct PhaseRunner {
    phases: Vec<Phase>,
    stop_on_fail: bool,
    default_range: PhaseRange,
    seed: SharedContext,
    pre_run: Option<Action>,
    post_run: Option<Action>,
}

impl Default for PhaseRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseRunner {
    pub fn new() -> Self {
        Self {
            phases: Vec::new(),
            stop_on_fail: true,
            default_range: PhaseRange::all(),
            seed: SharedContext::new(),
            pre_run: None,
            post_run: None,
        }
    }

    /// Build a runner whose stop policy, default selection and seed values
    /// come from `config`.
    pub fn from_config(config: &RunnerConfig) -> Self {
        Self {
            stop_on_fail: config.stop_on_fail,
            default_range: config.selection(),
            seed: config.seed_context(),
            ..Self::new()
        }
    }

    /// Register a phase with no declared inputs or outputs.
    pub fn add_phase<F>(&mut self, name: impl Into<String>, action: F) -> Result<(), RunnerError>
    where
        F: Fn(&SharedContext) -> anyhow::Result<PhaseOutput> + 'static,
    {
        self.register(Phase::new(name, action))
    }

    /// Append a fully declared phase. Rejects duplicate names without
    /// touching the existing list.
    pub fn register(&mut self, phase: Phase) -> Result<(), RunnerError> {
        if self.phase_exists(phase.name()) {
            return Err(RunnerError::DuplicateName {
                name: phase.name().to_string(),
            });
        }
        debug!(phase = %phase.name(), index = self.phases.len(), "registered phase");
        self.phases.push(phase);
        Ok(())
    }

    pub fn set_pre_run<F>(&mut self, hook: F)
    where
        F: Fn(&SharedContext) -> anyhow::Result<PhaseOutput> + 'static,
    {
        self.pre_run = Some(Box::new(hook));
    }

    pub fn set_post_run<F>(&mut self, hook: F)
    where
        F: Fn(&SharedContext) -> anyhow::Result<PhaseOutput> + 'static,
    {
        self.post_run = Some(Box::new(hook));
    }

    pub fn set_stop_on_fail(&mut self, stop: bool) {
        self.stop_on_fail = stop;
    }

    pub fn stop_on_fail(&self) -> bool {
        self.stop_on_fail
    }

    /// Values every run starts from, beneath any `initial_context`.
    pub fn seed_mut(&mut self) -> &mut SharedContext {
        &mut self.seed
    }

    /// Selection used for bounds a run call leaves unset.
    pub fn set_default_range(&mut self, range: PhaseRange) {
        self.default_range = range;
    }

    pub fn phase_names(&self) -> Vec<&str> {
        self.phases.iter().map(Phase::name).collect()
    }

    pub fn phase_exists(&self, name: &str) -> bool {
        self.phases.iter().any(|phase| names_match(phase.name(), name))
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Run phases `start..=end` (defaults: first and last) and return the
    /// final context.
    pub fn run(
        &self,
        start: Option<&str>,
        end: Option<&str>,
        initial_context: Option<SharedContext>,
    ) -> Result<SharedContext, RunnerError> {
        let report = self.run_range(&PhaseRange::new(start, end), initial_context)?;
        Ok(report.context)
    }

    /// Run the selected range and report each executed phase's status.
    ///
    /// Bounds missing from `range` fall back to the runner's default range.
    /// On any error the partially built context is dropped.
    pub fn run_range(
        &self,
        range: &PhaseRange,
        initial_context: Option<SharedContext>,
    ) -> Result<RunReport, RunnerError> {
        let range = range.clone().or(self.default_range.clone());
        let selected: &[Phase] = match range.resolve(&self.phases)? {
            Some(indices) => &self.phases[indices],
            None => &[],
        };

        let _span = info_span!("run", phases = selected.len()).entered();
        let mut context = self.seed.clone();
        if let Some(initial) = initial_context {
            context.merge(initial);
        }

        if let Some(hook) = &self.pre_run {
            self.run_hook(Hook::PreRun, hook, &mut context)?;
        } else {
            debug!("no pre-run hook");
        }

        let mut records = Vec::with_capacity(selected.len());
        for phase in selected {
            let status = self.run_phase(phase, &mut context)?;
            records.push(PhaseRecord {
                name: phase.name().to_string(),
                status,
            });
        }

        if let Some(hook) = &self.post_run {
            self.run_hook(Hook::PostRun, hook, &mut context)?;
        } else {
            debug!("no post-run hook");
        }

        info!(executed = records.len(), "run complete");
        for record in &records {
            info!(phase = %record.name, status = %record.status, "phase status");
        }

        Ok(RunReport {
            context,
            phases: records,
        })
    }

    fn run_phase(
        &self,
        phase: &Phase,
        context: &mut SharedContext,
    ) -> Result<PhaseStatus, RunnerError> {
        let name = phase.name();
        let _span = info_span!("phase", phase = %name).entered();

        let missing = context.missing_keys(phase.required_keys());
        if !missing.is_empty() {
            error!(keys = ?missing, "required keys missing");
            return Err(RunnerError::MissingParameter {
                phase: name.to_string(),
                keys: missing,
            });
        }

        info!("running phase");
        let output = phase.invoke(context).map_err(|err| match err.downcast::<MissingKey>() {
            Ok(missing) => RunnerError::MissingParameter {
                phase: name.to_string(),
                keys: vec![missing.key],
            },
            Err(source) => RunnerError::PhaseFailed {
                phase: name.to_string(),
                source,
            },
        })?;

        if output.status.is_passed() {
            let absent = output.updates.missing_keys(phase.output_keys());
            if !absent.is_empty() {
                return Err(RunnerError::MissingOutput {
                    phase: name.to_string(),
                    keys: absent,
                });
            }
        }

        debug!(keys = output.updates.len(), "merging phase updates");
        context.merge(output.updates);

        if !output.status.is_passed() {
            let stop = self.stop_on_fail && phase.stop_on_fail_override().unwrap_or(true);
            if stop {
                error!("phase failed and stop_on_fail is set, stopping run");
                return Err(RunnerError::Stopped {
                    phase: name.to_string(),
                });
            }
            warn!("phase failed, stop_on_fail not set, continuing");
        }
        info!(status = %output.status, "phase complete");
        Ok(output.status)
    }

    fn run_hook(
        &self,
        hook: Hook,
        action: &Action,
        context: &mut SharedContext,
    ) -> Result<(), RunnerError> {
        info!(%hook, "running hook");
        let output =
            action(&*context).map_err(|source| RunnerError::HookFailed { hook, source })?;
        context.merge(output.updates);
        if !output.status.is_passed() {
            if self.stop_on_fail {
                error!(%hook, "hook failed and stop_on_fail is set, stopping run");
                return Err(RunnerError::HookStopped { hook });
            }
            warn!(%hook, "hook failed, continuing");
        }
        Ok(())
    }
}

impl std::fmt::Debug for PhaseRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhaseRunner")
            .field("phases", &self.phases)
            .field("stop_on_fail", &self.stop_on_fail)
            .field("default_range", &self.default_range)
            .field("seed", &self.seed)
            .field("pre_run", &self.pre_run.is_some())
            .field("post_run", &self.post_run.is_some())
            .finish()
    }
}
