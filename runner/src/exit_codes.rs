//! Stable exit codes for the `phase-runner` binary.

/// Every selected phase ran to completion.
pub const OK: i32 = 0;
/// Invalid invocation: bad config, unknown phase name or inverted range.
pub const INVALID: i32 = 1;
/// The run aborted: missing parameter or output, phase error, or a failure
/// with `stop_on_fail` set.
pub const FAILED: i32 = 2;
