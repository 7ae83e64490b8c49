//! Container-layout validation and the one-time migration into it.
//!
//! Migration turns
//!
//! ```text
//! myproject/            (checkout of main)
//!     .git/
//!     src/
//! ```
//!
//! into
//!
//! ```text
//! myproject/            (container)
//!     main/             (the same checkout, moved)
//!         .git/
//!         src/
//! ```
//!
//! The move is a sequence of renames, not a copy, so a large checkout costs
//! no extra disk. It is not atomic: if a step fails, the checkout is left
//! at `<parent>/<name>_temp` (or `<parent>/<name>/<name>_temp` after step 3)
//! and the returned error names that path. Nothing is rolled back
//! automatically.

use std::fs;
use std::path::Path;

use crate::git::error::{self, Error, Result};
use crate::git::GIT_MARKER;

use super::Repository;

/// Suffix of the temporary directory name used during migration.
const TEMP_SUFFIX: &str = "_temp";

impl Repository {
    /// Whether the repository is already in container layout.
    ///
    /// True when the root directory is named after the main branch, or when
    /// the root is itself a linked worktree (`.git` is a file).
    pub fn is_valid_structure(&self) -> bool {
        let main_branch = self.main_branch();
        if self.root.file_name().is_some_and(|name| name == main_branch.as_str()) {
            return true;
        }
        self.root.join(GIT_MARKER).is_file()
    }

    /// Migration is offered only from the main branch's checkout.
    pub fn needs_restructure(&self) -> bool {
        if self.is_valid_structure() {
            return false;
        }
        matches!(self.current_branch(), Ok(Some(current)) if current == self.main_branch())
    }

    /// Move the checkout into a new container directory of the same name.
    ///
    /// Returns a handle bound to the new root (`container/<main>`). `self`
    /// is left pointing at the old location and should be dropped.
    pub fn restructure(&self) -> Result<Repository> {
        if self.is_valid_structure() {
            return Err(Error::Structure(format!(
                "{} is already in worktree structure",
                self.root.display()
            )));
        }

        let main_branch = self.main_branch();
        let original_name = self
            .root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                Error::Structure(format!("Cannot restructure {}", self.root.display()))
            })?;
        let parent = self.root.parent().ok_or_else(|| {
            Error::Structure(format!("{} has no parent directory", self.root.display()))
        })?;

        let temp_name = format!("{original_name}{TEMP_SUFFIX}");
        let temp_path = parent.join(&temp_name);
        if temp_path.exists() {
            return Err(Error::Structure(format!(
                "Temporary path {} already exists; remove it before restructuring",
                temp_path.display()
            )));
        }

        // Step 1: rename the checkout out of the way
        fs::rename(&self.root, &temp_path).map_err(|e| {
            error::restructure_step_failed("rename the checkout to a temporary name", &temp_path, e)
        })?;
        log::info!(
            "restructure 1/4: {} -> {}",
            self.root.display(),
            temp_path.display()
        );

        // Step 2: the original path becomes the container
        let container = self.root.clone();
        fs::create_dir(&container).map_err(|e| {
            error::restructure_step_failed("create the container directory", &temp_path, e)
        })?;
        log::info!("restructure 2/4: created {}", container.display());

        // Step 3: move the checkout inside the container
        let temp_inside = container.join(&temp_name);
        fs::rename(&temp_path, &temp_inside).map_err(|e| {
            error::restructure_step_failed("move the checkout into the container", &temp_path, e)
        })?;
        log::info!("restructure 3/4: moved into {}", temp_inside.display());

        // Step 4: name it after the main branch
        let new_root = container.join(&main_branch);
        rename_into_place(&temp_inside, &new_root).map_err(|e| {
            error::restructure_step_failed("rename the checkout to the main branch", &temp_inside, e)
        })?;
        log::info!("restructure 4/4: {} is the new root", new_root.display());

        // Step 5: re-bind. Linked worktrees created before the move still point
        // at the old metadata path; `worktree repair` rewrites those links.
        let repo = self.rebound(new_root, container);
        if let Err(e) = repo.run(&["worktree", "repair"]) {
            log::debug!("worktree repair after restructure failed: {e}");
        }
        Ok(repo)
    }
}

/// Rename, creating intermediate directories for main branches like `release/2.x`.
fn rename_into_place(from: &Path, to: &Path) -> std::io::Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::rename(from, to)
}
