//! Per-branch status, recent history, and uncommitted files.
//!
//! Everything here is advisory. No method fails: each git query that goes
//! wrong leaves its own field at the "no information" value and is logged
//! at debug level, while the remaining fields are still filled in.

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::git::parse::{
    parse_commit_log, parse_left_right_counts, parse_nul_separated, parse_status_porcelain,
    parse_timestamp,
};
use crate::git::{BranchStatus, CommitInfo, Result};

use super::Repository;

/// Commit log format: full hash, committer timestamp, raw body.
const COMMIT_LOG_FORMAT: &str = "--format=%H%x1f%ct%x1f%B%x1e";

/// Unwrap a best-effort query, falling back to the field's default.
fn or_default<T: Default>(what: &str, result: Result<T>) -> T {
    result.unwrap_or_else(|e| {
        log::debug!("{what} unavailable: {e}");
        T::default()
    })
}

impl Repository {
    /// Status of `name`'s checkout.
    ///
    /// Inspects the branch's worktree, or the active checkout when the
    /// branch is checked out there. A branch with no checkout only gets its
    /// last commit time.
    pub fn branch_status(&self, name: &str) -> BranchStatus {
        let Some(dir) = self.inspection_dir(name) else {
            let branch_ref = format!("refs/heads/{name}");
            return BranchStatus {
                last_commit_time: or_default(
                    "last commit time",
                    self.run(&["log", "-1", "--format=%ct", &branch_ref])
                        .map(|out| parse_timestamp(&out)),
                ),
                ..BranchStatus::default()
            };
        };

        // (false, 0): clean, nothing untracked
        let (dirty, untracked_count) = or_default(
            "working tree status",
            self.run_in(&dir, &["status", "--porcelain", "--untracked-files=all"])
                .map(|out| parse_status_porcelain(&out)),
        );

        // (0, 0) also covers a branch without an upstream
        let range = format!("{name}@{{upstream}}...{name}");
        let (ahead, behind) = or_default(
            "upstream divergence",
            self.run_in(&dir, &["rev-list", "--left-right", "--count", &range])
                .map(|out| parse_left_right_counts(&out).unwrap_or_default()),
        );

        let last_commit_time = or_default(
            "last commit time",
            self.run_in(&dir, &["log", "-1", "--format=%ct", "HEAD"])
                .map(|out| parse_timestamp(&out)),
        );

        let has_stash = or_default(
            "stash list",
            self.run_in(&dir, &["stash", "list"])
                .map(|out| !out.trim().is_empty()),
        );

        // Per-worktree metadata directory; in-progress operations leave markers there
        let git_dir: Option<PathBuf> = or_default(
            "git directory",
            self.run_in(&dir, &["rev-parse", "--absolute-git-dir"])
                .map(|out| Some(PathBuf::from(out.trim()))),
        );
        let marker = |name: &str| git_dir.as_deref().is_some_and(|d| d.join(name).exists());

        BranchStatus {
            dirty,
            untracked_count,
            ahead,
            behind,
            last_commit_time,
            has_stash,
            rebase_in_progress: marker("rebase-merge") || marker("rebase-apply"),
            merge_in_progress: marker("MERGE_HEAD"),
        }
    }

    /// The branch tip and up to `count - 1` of its ancestors, newest first.
    pub fn recent_commits(&self, name: &str, count: usize) -> Vec<CommitInfo> {
        if count == 0 {
            return Vec::new();
        }
        let limit = count.to_string();
        let branch_ref = format!("refs/heads/{name}");
        or_default(
            "recent commits",
            self.run(&["log", "-n", &limit, COMMIT_LOG_FORMAT, &branch_ref])
                .map(|out| parse_commit_log(&out)),
        )
    }

    /// Files with unstaged, staged, or untracked changes in `name`'s
    /// checkout, sorted and without duplicates.
    ///
    /// Empty when the branch has no checkout.
    pub fn uncommitted_files(&self, name: &str) -> Vec<String> {
        let Some(dir) = self.inspection_dir(name) else {
            return Vec::new();
        };

        let queries: [(&str, &[&str]); 3] = [
            ("unstaged changes", &["diff", "--name-only", "-z"]),
            ("staged changes", &["diff", "--name-only", "--cached", "-z"]),
            (
                "untracked files",
                &["ls-files", "--others", "--exclude-standard", "-z"],
            ),
        ];

        let files: BTreeSet<String> = queries
            .into_iter()
            .flat_map(|(what, args)| {
                or_default(
                    what,
                    self.run_in(&dir, args).map(|out| parse_nul_separated(&out)),
                )
            })
            .collect();
        files.into_iter().collect()
    }

    /// Checkout to inspect for `name`: its worktree, else the active
    /// checkout if `name` is checked out there.
    fn inspection_dir(&self, name: &str) -> Option<PathBuf> {
        if let Some(path) = self.list_worktrees().remove(name) {
            return Some(path);
        }
        match self.current_branch() {
            Ok(Some(current)) if current == name => Some(self.root.clone()),
            _ => None,
        }
    }
}
