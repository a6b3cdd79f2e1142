//! Named, ordered phases sharing a key-value context.
//!
//! A [`runner::PhaseRunner`] holds phases in registration order and runs a
//! contiguous, inclusive sub-range of them selected by name. Phases do not
//! call each other: each reads its inputs from the [`core::context::SharedContext`]
//! and returns updates that are merged back before the next phase runs.
//!
//! - **[`core`]**: phase declarations, the context, range resolution. No I/O.
//! - **[`runner`]**: registration, hooks and sequential execution.
//! - **[`io`]**, **[`cli`]**: TOML config and command-line selection for
//!   binaries that embed a runner.
//!
//! ```
//! use phase_runner::core::phase::PhaseOutput;
//! use phase_runner::runner::PhaseRunner;
//!
//! let mut runner = PhaseRunner::new();
//! runner.add_phase("load", |_| Ok(PhaseOutput::pass().with("n", 5)))?;
//! runner.add_phase("double", |ctx| {
//!     let n: i64 = ctx.require_as("n")?;
//!     Ok(PhaseOutput::pass().with("n2", n * 2))
//! })?;
//!
//! let ctx = runner.run(None, None, None)?;
//! assert_eq!(ctx.get("n2"), Some(&serde_json::json!(10)));
//! # Ok::<(), phase_runner::error::RunnerError>(())
//! ```

pub mod cli;
pub mod core;
pub mod demo;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod runner;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
