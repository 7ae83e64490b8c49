//! User and project configuration.
//!
//! The first existing file wins:
//! 1. `<repo root>/.wtrrc`
//! 2. `<repo root>/.wtrrc.toml`
//! 3. `~/.config/wtr/config.toml`
//!
//! All files are TOML. Any value can be overridden from the environment with
//! the `WTR_` prefix and `__` between section and key:
//!
//! ```text
//! WTR_WORKTREE__DEFAULT_BASE=develop
//! WTR_UI__PREVIEW_COUNT=10
//! ```

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

const ENV_PREFIX: &str = "WTR";

/// Project-local config file names, checked in order in the repository root.
pub const PROJECT_CONFIG_FILES: [&str; 2] = [".wtrrc", ".wtrrc.toml"];

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct WtrConfig {
    pub worktree: WorktreeConfig,
    pub ui: UiConfig,
    pub prune: PruneConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct WorktreeConfig {
    /// Base for new branches. Empty means the detected main branch.
    pub default_base: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    pub show_status: bool,
    pub show_preview: bool,
    /// Number of commits shown in previews.
    pub preview_count: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_status: true,
            show_preview: true,
            preview_count: 5,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PruneConfig {
    /// Mention stale worktrees after listing.
    pub auto_suggest: bool,
}

impl Default for PruneConfig {
    fn default() -> Self {
        Self { auto_suggest: true }
    }
}

impl WtrConfig {
    /// Load configuration for the checkout at `repo_root`.
    ///
    /// Never fails: an unreadable or invalid file is reported as a warning
    /// and the defaults are used instead.
    pub fn load(repo_root: Option<&Path>) -> Self {
        let path = find_config_file(repo_root);
        match Self::load_from(path.as_deref(), env_source()) {
            Ok(config) => config,
            Err(e) => {
                match &path {
                    Some(path) => log::warn!("Ignoring config {}: {e}", path.display()),
                    None => log::warn!("Ignoring configuration: {e}"),
                }
                Self::default()
            }
        }
    }

    /// Build from an optional TOML file plus an environment source.
    pub fn load_from(path: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }
        builder.add_source(env).build()?.try_deserialize()
    }

    /// Configured default base, if any.
    pub fn default_base(&self) -> Option<&str> {
        let base = self.worktree.default_base.trim();
        (!base.is_empty()).then_some(base)
    }
}

/// First existing config file for `repo_root`, falling back to the user's.
pub fn find_config_file(repo_root: Option<&Path>) -> Option<PathBuf> {
    let project = repo_root
        .into_iter()
        .flat_map(|root| PROJECT_CONFIG_FILES.iter().map(move |name| root.join(name)));
    project
        .chain(user_config_path())
        .find(|path| path.is_file())
}

/// `~/.config/wtr/config.toml` on every platform.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("wtr").join("config.toml"))
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
