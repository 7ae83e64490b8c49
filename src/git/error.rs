//! Error taxonomy for worktree operations
//!
//! The core never retries and never prints. Every failure surfaces as one of
//! four variants, and the caller decides how to render it.

use std::path::Path;

/// Typed failure returned by every fallible core operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Conflicting or missing arguments, or a target that is already occupied.
    #[error("{0}")]
    Validation(String),
    /// A referenced branch, worktree, or commit does not exist.
    #[error("{0}")]
    NotFound(String),
    /// The `git` command failed; `message` is its diagnostic verbatim.
    #[error("git {command} failed: {message}")]
    GitOperation { command: String, message: String },
    /// The repository is not in container layout, or migration failed mid-step.
    #[error("{0}")]
    Structure(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub fn git(command: impl Into<String>, message: impl Into<String>) -> Self {
        Error::GitOperation {
            command: command.into(),
            message: message.into().trim_end().to_string(),
        }
    }

    /// Short category label for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation",
            Error::NotFound(_) => "not found",
            Error::GitOperation { .. } => "git",
            Error::Structure(_) => "structure",
        }
    }
}

// =============================================================================
// Constructors for recurring messages
// =============================================================================

pub fn commit_and_base_conflict() -> Error {
    Error::Validation("commit and base branch are mutually exclusive".to_string())
}

pub fn path_exists(path: &Path) -> Error {
    Error::Validation(format!("Directory already exists: {}", path.display()))
}

pub fn commit_not_found(commit: &str) -> Error {
    Error::NotFound(format!("Commit '{commit}' not found"))
}

pub fn no_worktree(name: &str) -> Error {
    Error::NotFound(format!("No worktree for branch: {name}"))
}

pub fn not_a_repository(path: &Path) -> Error {
    Error::NotFound(format!("Not a git repository: {}", path.display()))
}

/// A migration step failed. The message names the step and the temporary
/// directory so an operator can finish or undo the move by hand.
pub fn restructure_step_failed(
    step: &str,
    temp_path: &Path,
    source: impl std::fmt::Display,
) -> Error {
    Error::Structure(format!(
        "Restructure failed while trying to {step}: {source}. \
         Temporary directory: {}. Move it back to its original location to recover.",
        temp_path.display()
    ))
}
