//! Stale worktree detection.

use std::collections::BTreeSet;

use crate::git::{Result, StaleReason};

use super::Repository;

impl Repository {
    /// Worktrees whose checkout is no longer needed, in listing order.
    ///
    /// A worktree is stale when its branch no longer exists locally, or when
    /// its tip is reachable from the main branch's tip. The main branch's own
    /// worktree is never reported. Detached worktrees are keyed by directory
    /// name, so they report as [`StaleReason::BranchDeleted`] unless a branch
    /// of that name exists.
    pub fn find_stale_worktrees(&self) -> Result<Vec<(String, StaleReason)>> {
        let branches: BTreeSet<String> = self.local_branches()?.into_iter().collect();
        let main_branch = self.main_branch();

        let stale = self
            .worktrees()
            .into_iter()
            .filter(|wt| wt.name != main_branch)
            .filter_map(|wt| {
                if !branches.contains(&wt.name) {
                    Some((wt.name, StaleReason::BranchDeleted))
                } else if self.is_branch_merged(&wt.name, &main_branch) {
                    Some((wt.name, StaleReason::MergedInto(main_branch.clone())))
                } else {
                    None
                }
            })
            .collect();

        Ok(stale)
    }
}
