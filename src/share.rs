//! Shared resources between worktrees.
//!
//! An optional `share_obj.yaml` at the container root lists, per source
//! worktree, paths that new worktrees should link to instead of holding
//! their own copy:
//!
//! ```yaml
//! main:
//!   - .env
//!   - node_modules
//!   - config/local.toml
//! ```
//!
//! Each item becomes a relative symlink inside the new worktree pointing
//! through the container at the same path in the source worktree. Every
//! problem is reported as a warning; none of them fail worktree creation.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use serde_yaml::Value;

/// Manifest file name, looked up at the container root.
pub const MANIFEST_FILE: &str = "share_obj.yaml";

/// Parsed manifest: source worktree name to item paths.
///
/// Entries whose value is not a list of strings are kept as errors so they
/// can be reported per source.
#[derive(Debug, Default, PartialEq)]
pub struct ShareManifest {
    pub sources: BTreeMap<String, Result<Vec<String>, String>>,
}

impl ShareManifest {
    /// Load the manifest from `container`. `Ok(None)` when there is none.
    pub fn load(container: &Path) -> Result<Option<Self>, String> {
        let path = container.join(MANIFEST_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path).map_err(|e| e.to_string())?;
        Self::parse(&contents).map(Some)
    }

    pub fn parse(contents: &str) -> Result<Self, String> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let raw: Option<BTreeMap<String, Value>> =
            serde_yaml::from_str(contents).map_err(|e| e.to_string())?;

        let sources = raw
            .unwrap_or_default()
            .into_iter()
            .map(|(source, value)| {
                let items = match value {
                    Value::Sequence(items) => items
                        .into_iter()
                        .map(|item| match item {
                            Value::String(s) => Ok(s),
                            other => Err(format!(
                                "Invalid item for '{source}': {}",
                                describe(&other)
                            )),
                        })
                        .collect::<Result<Vec<_>, _>>(),
                    _ => Err(format!("Invalid format for '{source}': expected list")),
                };
                (source, items)
            })
            .collect();

        Ok(Self { sources })
    }
}

/// Create the manifest's symlinks inside a freshly created worktree.
///
/// Returns warnings: manifest problems, sources that do not exist yet (the
/// link is still created), and links that could not be created.
pub fn create_shared_symlinks(worktree_path: &Path, container: &Path) -> Vec<String> {
    let mut warnings = Vec::new();

    let manifest = match ShareManifest::load(container) {
        Ok(Some(manifest)) => manifest,
        Ok(None) => return warnings,
        Err(e) => {
            warnings.push(format!("Failed to read {MANIFEST_FILE}: {e}"));
            return warnings;
        }
    };

    // `feature/login` for a checkout at `container/feature/login`
    let worktree_name = worktree_path
        .strip_prefix(container)
        .unwrap_or(worktree_path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/");

    for (source, items) in manifest.sources {
        if source == worktree_name {
            continue;
        }
        let items = match items {
            Ok(items) => items,
            Err(e) => {
                warnings.push(e);
                continue;
            }
        };

        let source_root = container.join(&source);
        for item in items {
            if !is_plain_relative(Path::new(&item)) {
                warnings.push(format!("Skipping {source}/{item}: not a relative path"));
                continue;
            }

            if !source_root.join(&item).exists() {
                warnings.push(format!("Source does not exist: {source}/{item}"));
            }

            let link = worktree_path.join(&item);
            let target = link_target(&source_root.join(&item), &link);
            // Nested items may live in directories the new checkout lacks
            let created = match link.parent() {
                Some(parent) => fs::create_dir_all(parent).and_then(|_| symlink(&target, &link)),
                None => symlink(&target, &link),
            };
            if let Err(e) = created {
                warnings.push(format!("Failed to create symlink {item}: {e}"));
            }
        }
    }

    warnings
}

/// Relative target for a link at `link` pointing to `source`.
///
/// Goes up from the link's directory to the container and back down, so
/// nested items (`config/local.toml`) resolve correctly.
fn link_target(source: &Path, link: &Path) -> PathBuf {
    let link_dir = link.parent().unwrap_or(link);
    pathdiff::diff_paths(source, link_dir).unwrap_or_else(|| source.to_path_buf())
}

fn is_plain_relative(path: &Path) -> bool {
    path.components().all(|c| matches!(c, Component::Normal(_)))
        && path.components().next().is_some()
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "list",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    let resolved = link.parent().map(|dir| dir.join(target));
    if resolved.is_some_and(|p| p.is_dir()) {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    }
}
