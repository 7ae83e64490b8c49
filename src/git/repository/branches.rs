//! Branch, tag, and commit queries for Repository.

use crate::git::Result;
use crate::git::parse::parse_lines;

use super::Repository;

impl Repository {
    /// Current branch of the active checkout, or None when HEAD is detached.
    pub fn current_branch(&self) -> Result<Option<String>> {
        let stdout = self.run(&["branch", "--show-current"])?;
        let branch = stdout.trim();
        Ok((!branch.is_empty()).then(|| branch.to_string()))
    }

    /// All local branch names, sorted.
    pub fn local_branches(&self) -> Result<Vec<String>> {
        // lstrip=2 rather than refname:short, which prefixes "heads/" when a
        // remote-tracking ref has the same name
        let stdout = self.run(&["branch", "--format=%(refname:lstrip=2)"])?;
        let mut branches = parse_lines(&stdout);
        branches.sort();
        Ok(branches)
    }

    /// All tag names, sorted.
    pub fn tags(&self) -> Result<Vec<String>> {
        let stdout = self.run(&["tag", "--list"])?;
        let mut tags = parse_lines(&stdout);
        tags.sort();
        Ok(tags)
    }

    /// Check if a local branch exists.
    pub fn branch_exists(&self, name: &str) -> bool {
        self.succeeds(&[
            "rev-parse",
            "--verify",
            "--quiet",
            &format!("refs/heads/{name}"),
        ])
    }

    /// Resolve any commit-ish (hash, tag, branch, `HEAD~2`) to a full hash.
    ///
    /// Returns None when it does not name a commit.
    pub fn resolve_commit(&self, commit_ish: &str) -> Option<String> {
        // ^{commit} peels annotated tags to the commit they point at
        self.run(&[
            "rev-parse",
            "--verify",
            "--quiet",
            &format!("{commit_ish}^{{commit}}"),
        ])
        .ok()
        .map(|sha| sha.trim().to_string())
        .filter(|sha| !sha.is_empty())
    }

    /// Whether `branch`'s tip is reachable from `into`'s tip.
    ///
    /// Uses git's own reachability check. Any failure, including either
    /// branch being absent, counts as not merged.
    pub fn is_branch_merged(&self, branch: &str, into: &str) -> bool {
        self.succeeds(&[
            "merge-base",
            "--is-ancestor",
            &format!("refs/heads/{branch}"),
            &format!("refs/heads/{into}"),
        ])
    }
}
