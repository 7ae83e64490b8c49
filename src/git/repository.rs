//! Repository handle and main-branch detection.
//!
//! Operations are grouped by concern in the submodules:
//! - `branches`: branch, tag, and commit queries
//! - `worktrees`: discovery of the branch -> checkout mapping
//! - `structure`: container-layout validation and migration
//! - `lifecycle`: worktree creation, deletion, bulk pruning
//! - `stale`: merged/deleted branch detection
//! - `status`: per-branch status, history, uncommitted files

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::{self, Result};
use super::parse::parse_remote_head;
use super::{FALLBACK_MAIN_BRANCH, Git, SystemGit};

mod branches;
mod lifecycle;
mod stale;
mod status;
mod structure;
mod worktrees;

pub use lifecycle::{CreateOptions, Created};

/// Handle on the active checkout of a repository.
///
/// The handle is a value: [`Repository::restructure`] returns a new one
/// rather than mutating this one, so a handle obtained before a migration
/// keeps pointing at the old (now moved) location.
#[derive(Debug, Clone)]
pub struct Repository {
    root: PathBuf,
    container: PathBuf,
    default_base: Option<String>,
    git: Arc<dyn Git>,
}

impl Repository {
    /// Find the checkout enclosing `path` using the system `git`.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self> {
        Self::discover_with(Arc::new(SystemGit), path)
    }

    /// Find the checkout enclosing `path` through the given gateway.
    pub fn discover_with(git: Arc<dyn Git>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let toplevel = git
            .run(path, &["rev-parse", "--show-toplevel"])
            .map_err(|_| error::not_a_repository(path))?;
        let toplevel = PathBuf::from(toplevel.trim());
        let root = dunce::canonicalize(&toplevel).unwrap_or(toplevel);
        Ok(Self::open(git, root))
    }

    /// Wrap a known checkout root without asking git to locate it.
    pub fn open(git: Arc<dyn Git>, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let container = root
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| root.clone());
        Self {
            root,
            container,
            default_base: None,
            git,
        }
    }

    /// Base branch for new branches when the caller names none.
    ///
    /// An empty string means "no preference" and falls back to the main branch.
    pub fn with_default_base(mut self, base: impl Into<String>) -> Self {
        let base = base.into();
        self.default_base = (!base.trim().is_empty()).then_some(base);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Parent directory holding the checkouts side by side.
    pub fn container(&self) -> &Path {
        &self.container
    }

    pub fn default_base(&self) -> Option<&str> {
        self.default_base.as_deref()
    }

    /// Detect the main branch.
    ///
    /// Preference order: the remote's default-branch pointer
    /// (`origin/HEAD`), a local `main`, a local `master`, the current branch,
    /// the alphabetically first local branch, then [`FALLBACK_MAIN_BRANCH`].
    ///
    /// Derived on every call; it changes if the remote default changes.
    pub fn main_branch(&self) -> String {
        if let Ok(output) = self.run(&["symbolic-ref", "--short", "refs/remotes/origin/HEAD"])
            && let Some(branch) = parse_remote_head(&output)
        {
            return branch;
        }

        let branches = self.local_branches().unwrap_or_default();
        for candidate in ["main", "master"] {
            if branches.iter().any(|b| b == candidate) {
                return candidate.to_string();
            }
        }

        if let Ok(Some(current)) = self.current_branch() {
            return current;
        }

        branches
            .into_iter()
            .next()
            .unwrap_or_else(|| FALLBACK_MAIN_BRANCH.to_string())
    }

    /// Run git in the active checkout.
    pub(crate) fn run(&self, args: &[&str]) -> Result<String> {
        self.git.run(&self.root, args)
    }

    /// Run git in another checkout of this repository.
    pub(crate) fn run_in(&self, dir: &Path, args: &[&str]) -> Result<String> {
        self.git.run(dir, args)
    }

    pub(crate) fn succeeds(&self, args: &[&str]) -> bool {
        self.git.succeeds(&self.root, args)
    }

    /// A copy of this handle re-bound to a new root and container.
    fn rebound(&self, root: PathBuf, container: PathBuf) -> Self {
        Self {
            root,
            container,
            default_base: self.default_base.clone(),
            git: Arc::clone(&self.git),
        }
    }
}
