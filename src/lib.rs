//! Git worktree manager for repositories in container layout.
//!
//! The engine lives in [`git`]: [`git::Repository`] discovers, creates,
//! removes, and inspects worktrees, and migrates an ordinary checkout into
//! the container layout. [`fuzzy`] ranks branch names for interactive
//! narrowing. The `wtr` binary is one presentation layer over both.

pub mod config;
pub mod fuzzy;
pub mod git;
pub mod share;
pub mod shell_exec;
pub mod styling;
pub mod utils;

pub use git::{Error, Repository};
