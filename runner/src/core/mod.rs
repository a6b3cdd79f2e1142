//! Phase declarations, the shared context and range resolution.
//!
//! Nothing here performs I/O; execution lives in [`crate::runner`].

pub mod context;
pub mod phase;
pub mod range;
