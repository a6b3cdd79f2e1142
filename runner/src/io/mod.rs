//! I/O helpers for the phase runner.

pub mod config;
