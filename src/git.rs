//! Git worktree engine for container-layout repositories.
//!
//! A container is a plain directory holding one checkout per branch:
//!
//! ```text
//! myproject/            <- container
//!     main/             <- primary checkout (.git is a directory)
//!     feature-auth/     <- linked worktree (.git is a file)
//!     v1.2.0/           <- detached worktree, keyed by directory name
//! ```
//!
//! All repository state comes from the `git` command line through the [`Git`]
//! gateway. Nothing is persisted by this crate; git is the system of record.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::shell_exec::Cmd;

mod error;
mod parse;
mod repository;

pub use error::{Error, Result};
pub use repository::{CreateOptions, Created, Repository};

/// Name of the metadata marker at the root of every checkout.
///
/// A directory for the primary checkout, a file (`gitdir: ...`) for a linked
/// worktree.
pub const GIT_MARKER: &str = ".git";

/// Fallback main branch name when nothing else can be detected.
pub const FALLBACK_MAIN_BRANCH: &str = "master";

/// Boundary to the external version-control command line.
///
/// Implementations run one subcommand in `dir` and return its stdout. A
/// non-zero exit must surface as [`Error::GitOperation`] carrying the tool's
/// stderr.
pub trait Git: fmt::Debug + Send + Sync {
    fn run(&self, dir: &Path, args: &[&str]) -> Result<String>;

    /// Whether the command exits successfully. Used for yes/no queries such
    /// as `rev-parse --verify` and `merge-base --is-ancestor`.
    fn succeeds(&self, dir: &Path, args: &[&str]) -> bool {
        self.run(dir, args).is_ok()
    }
}

/// Variables that pin git to one repository regardless of working directory.
const INHERITED_REPO_VARS: [&str; 3] = ["GIT_DIR", "GIT_WORK_TREE", "GIT_INDEX_FILE"];

/// [`Git`] implementation backed by the `git` binary on `PATH`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemGit;

impl Git for SystemGit {
    fn run(&self, dir: &Path, args: &[&str]) -> Result<String> {
        let context = dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| dir.display().to_string());

        let mut cmd = Cmd::new("git")
            .args(args.iter().copied())
            .current_dir(dir)
            .context(context)
            // Status queries must not take the index lock away from the user
            .env("GIT_OPTIONAL_LOCKS", "0");
        // Inherited from a hook, these would override `dir`
        for var in INHERITED_REPO_VARS {
            cmd = cmd.env_remove(var);
        }

        let output = cmd
            .run()
            .map_err(|e| Error::git(args.join(" "), e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::git(args.join(" "), stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// A managed checkout inside the container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Worktree {
    /// Branch name, or the directory name for a detached checkout.
    pub name: String,
    pub path: PathBuf,
    pub detached: bool,
}

/// One entry of `git worktree list --porcelain`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorktreeEntry {
    pub path: PathBuf,
    pub head: String,
    pub branch: Option<String>,
    pub bare: bool,
    pub detached: bool,
    pub locked: Option<String>,
    pub prunable: Option<String>,
}

/// Advisory status for one branch.
///
/// Every field defaults to "no information", which is also what a field
/// holds when its query failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BranchStatus {
    /// Tracked files differ from HEAD (untracked files do not count).
    pub dirty: bool,
    pub untracked_count: usize,
    /// Commits on the branch not on its upstream.
    pub ahead: usize,
    /// Commits on the upstream not on the branch.
    pub behind: usize,
    pub last_commit_time: Option<DateTime<Utc>>,
    pub has_stash: bool,
    pub rebase_in_progress: bool,
    pub merge_in_progress: bool,
}

/// A commit summary for previews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitInfo {
    /// Abbreviated hash ([`SHORT_SHA_LEN`] characters).
    pub sha: String,
    /// First line of the message, at most [`MESSAGE_MAX_CHARS`] characters.
    pub message: String,
    pub time: DateTime<Utc>,
}

pub const SHORT_SHA_LEN: usize = 7;
pub const MESSAGE_MAX_CHARS: usize = 60;

/// Why a worktree no longer needs an active checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StaleReason {
    BranchDeleted,
    MergedInto(String),
}

impl fmt::Display for StaleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaleReason::BranchDeleted => write!(f, "branch deleted"),
            StaleReason::MergedInto(target) => write!(f, "merged to {target}"),
        }
    }
}
