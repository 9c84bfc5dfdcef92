//! Interactive hand labeling of tabular data.
//!
//! Rows whose label column is null are shown to an operator one at a time;
//! a random share of the collected labels can then be re-asked blind to
//! measure how consistent the operator is.

/// Application directory resolution.
pub mod app_dirs;
/// TOML-backed session defaults.
pub mod config;
/// Labeling sessions, oracles and consistency checks.
pub mod labeling;
/// Tracing subscriber setup.
pub mod logging;
/// In-memory tables and JSON Lines I/O.
pub mod table;
