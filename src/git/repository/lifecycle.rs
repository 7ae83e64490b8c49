//! Worktree creation, deletion, and bulk pruning for Repository.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::git::error::{self, Error, Result};
use crate::share;

use super::Repository;

/// How to create a worktree. `base` and `commit` are mutually exclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateOptions {
    /// Start a new branch from this branch (defaults to the configured base,
    /// then the main branch). Ignored when the branch already exists.
    pub base: Option<String>,
    /// Check out this commit-ish (hash or tag) instead of a branch.
    pub commit: Option<String>,
    /// With `commit`: create a new branch there instead of detaching.
    pub create_branch: bool,
    /// Link shared resources listed in the container's manifest.
    pub share: bool,
}

impl CreateOptions {
    pub fn from_base(base: impl Into<String>) -> Self {
        Self {
            base: Some(base.into()),
            ..Self::default()
        }
    }

    pub fn at_commit(commit: impl Into<String>, create_branch: bool) -> Self {
        Self {
            commit: Some(commit.into()),
            create_branch,
            ..Self::default()
        }
    }

    pub fn with_shared_links(mut self) -> Self {
        self.share = true;
        self
    }
}

/// A newly created worktree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Created {
    pub path: PathBuf,
    /// Non-fatal problems from linking shared resources.
    pub warnings: Vec<String>,
}

impl Repository {
    /// Create a worktree at `container/<name>`.
    ///
    /// - With a commit: verify it resolves, then check it out detached, or on
    ///   a new branch `name` when `create_branch` is set.
    /// - Otherwise, if branch `name` exists, attach a worktree to it.
    /// - Otherwise create branch `name` from the base and attach a worktree.
    ///
    /// Arguments and the target path are validated before git is asked to
    /// change anything.
    pub fn create_worktree(&self, name: &str, options: &CreateOptions) -> Result<Created> {
        if name.trim().is_empty() {
            return Err(Error::Validation("worktree name is required".to_string()));
        }
        if options.commit.is_some() && options.base.is_some() {
            return Err(error::commit_and_base_conflict());
        }
        if options.create_branch && options.commit.is_none() {
            return Err(Error::Validation(
                "creating a branch from a commit requires a commit".to_string(),
            ));
        }

        let path = self.worktree_path(name);
        if path.exists() {
            return Err(error::path_exists(&path));
        }
        let path_arg = path.to_string_lossy().into_owned();

        if let Some(commit) = options.commit.as_deref() {
            if self.resolve_commit(commit).is_none() {
                return Err(error::commit_not_found(commit));
            }
            if options.create_branch {
                self.run(&["worktree", "add", "-b", name, &path_arg, commit])?;
            } else {
                self.run(&["worktree", "add", "--detach", &path_arg, commit])?;
            }
        } else if self.branch_exists(name) {
            self.run(&["worktree", "add", &path_arg, name])?;
        } else {
            let base = match options.base.as_deref().or(self.default_base()) {
                Some(base) => base.to_string(),
                None => self.main_branch(),
            };
            self.run(&["worktree", "add", "-b", name, &path_arg, &base])?;
        }
        log::debug!("created worktree {name} at {}", path.display());

        let warnings = if options.share {
            share::create_shared_symlinks(&path, &self.container)
        } else {
            Vec::new()
        };

        Ok(Created { path, warnings })
    }

    /// Remove the worktree registered under `name`, keeping its branch.
    ///
    /// Removal is forced: uncommitted changes in the checkout are discarded.
    pub fn delete_worktree(&self, name: &str) -> Result<()> {
        let worktrees = self.list_worktrees();
        let Some(path) = worktrees.get(name) else {
            return Err(error::no_worktree(name));
        };
        let path_arg = path.to_string_lossy();
        self.run(&["worktree", "remove", "--force", &path_arg])?;
        log::debug!("removed worktree {name} at {}", path.display());
        self.remove_empty_parents(path);
        Ok(())
    }

    /// After removing `container/feature/login`, drop `container/feature`
    /// if nothing else lives there. Stops at the first non-empty directory.
    fn remove_empty_parents(&self, removed: &Path) {
        for dir in removed.ancestors().skip(1) {
            if dir == self.container || !dir.starts_with(&self.container) {
                break;
            }
            if fs::remove_dir(dir).is_err() {
                break;
            }
            log::debug!("removed empty directory {}", dir.display());
        }
    }

    /// Delete each named worktree independently.
    ///
    /// A failure for one name does not stop the others; every name gets an
    /// outcome in the returned map.
    pub fn prune_worktrees<S: AsRef<str>>(&self, names: &[S]) -> BTreeMap<String, Result<()>> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                (name.to_string(), self.delete_worktree(name))
            })
            .collect()
    }
}
