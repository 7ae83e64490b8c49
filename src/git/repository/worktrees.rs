//! Worktree discovery for Repository.
//!
//! Two sources are reconciled: git's worktree registry, which knows which
//! branch each linked checkout is on, and the container directory. A
//! checkout anywhere below the container is managed if its `.git` is a file
//! (a link into the shared repository); registered checkouts are found at
//! any depth, so `feature/login` lives at `container/feature/login`.
//! Unregistered ones are only picked up among the container's direct
//! children. The main branch's checkout is added by convention as
//! `container/<main>`.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use crate::git::parse::parse_worktree_list;
use crate::git::{GIT_MARKER, Result, Worktree, WorktreeEntry};

use super::Repository;

impl Repository {
    /// Map of worktree name to checkout path.
    ///
    /// Names are branch names, or the directory name for detached
    /// checkouts. Empty when the container does not exist.
    pub fn list_worktrees(&self) -> BTreeMap<String, PathBuf> {
        self.worktrees()
            .into_iter()
            .map(|wt| (wt.name, wt.path))
            .collect()
    }

    /// Managed worktrees, main branch first, then by path.
    ///
    /// Entries that do not resolve to a valid checkout are skipped, since
    /// unrelated directories may live alongside the worktrees.
    pub fn worktrees(&self) -> Vec<Worktree> {
        let mut found: Vec<Worktree> = Vec::new();

        if !self.container.is_dir() {
            return found;
        }

        let main_branch = self.main_branch();
        let main_path = self.container.join(&main_branch);
        if main_path.exists() {
            found.push(Worktree {
                name: main_branch,
                path: main_path.clone(),
                detached: false,
            });
        }

        let registry: HashMap<PathBuf, WorktreeEntry> = self
            .raw_worktree_list()
            .unwrap_or_else(|e| {
                log::debug!("worktree registry unavailable: {e}");
                Vec::new()
            })
            .into_iter()
            .map(|entry| (canonical(&entry.path), entry))
            .collect();

        // Sorted by path for a stable discovery order
        let candidates: BTreeSet<PathBuf> = registry
            .keys()
            .filter(|path| path.starts_with(&self.container))
            .cloned()
            .chain(self.container_children())
            .collect();

        for dir in candidates {
            if dir == main_path || !dir.join(GIT_MARKER).is_file() {
                continue;
            }
            let Some(worktree) = self.resolve_linked(&dir, registry.get(&canonical(&dir))) else {
                log::debug!("skipping {}: not a valid checkout", dir.display());
                continue;
            };
            if found.iter().any(|wt| wt.name == worktree.name) {
                log::debug!(
                    "skipping {}: name {} already taken",
                    dir.display(),
                    worktree.name
                );
                continue;
            }
            found.push(worktree);
        }

        found
    }

    /// Registered checkouts as (path, branch) pairs; branch is None when detached.
    pub fn raw_worktrees(&self) -> Result<Vec<(PathBuf, Option<String>)>> {
        Ok(self
            .raw_worktree_list()?
            .into_iter()
            .filter(|entry| !entry.bare)
            .map(|entry| (entry.path, entry.branch))
            .collect())
    }

    /// Path git has registered for the main branch, if it is checked out anywhere.
    pub fn main_worktree_path(&self) -> Option<PathBuf> {
        let main_branch = self.main_branch();
        self.raw_worktrees()
            .ok()?
            .into_iter()
            .find(|(_, branch)| branch.as_deref() == Some(main_branch.as_str()))
            .map(|(path, _)| path)
    }

    /// More than the primary checkout is registered.
    pub fn has_multiple_worktrees(&self) -> bool {
        self.raw_worktrees().map(|wts| wts.len() > 1).unwrap_or(false)
    }

    pub fn worktree_exists(&self, name: &str) -> bool {
        self.list_worktrees().contains_key(name)
    }

    /// Where the worktree for `name` lives (or would be created).
    pub fn worktree_path(&self, name: &str) -> PathBuf {
        self.container.join(name)
    }

    fn raw_worktree_list(&self) -> Result<Vec<WorktreeEntry>> {
        let stdout = self.run(&["worktree", "list", "--porcelain"])?;
        Ok(parse_worktree_list(&stdout))
    }

    /// Child directories of the container.
    fn container_children(&self) -> Vec<PathBuf> {
        let entries = match fs::read_dir(&self.container) {
            Ok(entries) => entries,
            Err(e) => {
                log::debug!("cannot read {}: {e}", self.container.display());
                return Vec::new();
            }
        };
        entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect()
    }

    /// `dir` relative to the container with `/` separators (`feature/login`).
    fn relative_name(&self, dir: &Path) -> Option<String> {
        let relative = dir.strip_prefix(&self.container).ok()?;
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        (!parts.is_empty()).then(|| parts.join("/"))
    }

    /// Name a linked checkout from its registry entry, asking git directly
    /// when the registry does not know the directory.
    fn resolve_linked(&self, dir: &Path, entry: Option<&WorktreeEntry>) -> Option<Worktree> {
        let dir_name = self.relative_name(dir)?;

        let branch = match entry {
            Some(entry) if entry.prunable.is_some() => return None,
            Some(entry) => entry.branch.clone(),
            None => {
                let stdout = self.run_in(dir, &["branch", "--show-current"]).ok()?;
                let branch = stdout.trim();
                (!branch.is_empty()).then(|| branch.to_string())
            }
        };

        Some(match branch {
            Some(name) => Worktree {
                name,
                path: dir.to_path_buf(),
                detached: false,
            },
            None => Worktree {
                name: dir_name,
                path: dir.to_path_buf(),
                detached: true,
            },
        })
    }
}

fn canonical(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
