use std::process::ExitCode;

use anyhow::bail;
use color_print::cformat;
use wtr::fuzzy;
use wtr::git::{CreateOptions, Error, SHORT_SHA_LEN};
use wtr::styling::{HINT_EMOJI, INFO_EMOJI, SUCCESS_EMOJI, WARNING_EMOJI, eprintln, println};

use super::{CommandEnv, EXIT_FAILURE, confirm, nothing_to_do};

/// Handle `wtr switch`: print the worktree's path for the shell wrapper.
pub fn handle_switch(env: &CommandEnv, name: &str) -> anyhow::Result<ExitCode> {
    let worktrees = env.repo.list_worktrees();
    if let Some(path) = worktrees.get(name) {
        println!("{}", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let names: Vec<&str> = worktrees.keys().map(String::as_str).collect();
    let suggestions = fuzzy::filter_names(&names, name, fuzzy::DEFAULT_THRESHOLD);
    if !suggestions.is_empty() {
        let joined = suggestions.join(", ");
        eprintln!("{}", cformat!("{HINT_EMOJI} <dim>Did you mean: <bold>{joined}</></>"));
    } else if !names.is_empty() {
        let joined = names.join(", ");
        eprintln!("{}", cformat!("{HINT_EMOJI} <dim>Available: {joined}</>"));
    }
    Err(Error::NotFound(format!("Worktree '{name}' does not exist")).into())
}

/// Handle `wtr add`
pub fn handle_add(
    env: &CommandEnv,
    name: Option<String>,
    base: Option<String>,
    commit: Option<String>,
    create_branch: bool,
) -> anyhow::Result<ExitCode> {
    let repo = &env.repo;
    if !repo.is_valid_structure() {
        return Err(Error::Structure(
            "Repository is not in worktree structure; run `wtr restructure` first".to_string(),
        )
        .into());
    }

    let Some(name) = name.or_else(|| commit.as_deref().map(default_detached_name)) else {
        return Err(Error::Validation(
            "A worktree name is required (or use -c for a commit)".to_string(),
        )
        .into());
    };
    if repo.worktree_exists(&name) {
        return Err(Error::Validation(format!("Worktree '{name}' already exists")).into());
    }

    let options = CreateOptions {
        base,
        commit,
        create_branch,
        share: true,
    };
    let created = repo.create_worktree(&name, &options)?;

    for warning in &created.warnings {
        eprintln!("{}", cformat!("{WARNING_EMOJI} <yellow>{warning}</>"));
    }
    eprintln!(
        "{}",
        cformat!("{SUCCESS_EMOJI} <green>Created worktree <bold>{name}</></>")
    );
    println!("{}", created.path.display());
    Ok(ExitCode::SUCCESS)
}

/// Directory name for a commit checkout: the first characters of the commit-ish.
fn default_detached_name(commit: &str) -> String {
    commit.chars().take(SHORT_SHA_LEN).collect()
}

/// Handle `wtr delete`
pub fn handle_delete(env: &CommandEnv, name: &str) -> anyhow::Result<ExitCode> {
    env.repo.delete_worktree(name)?;
    eprintln!(
        "{}",
        cformat!("{SUCCESS_EMOJI} <green>Deleted worktree <bold>{name}</></>")
    );
    Ok(ExitCode::SUCCESS)
}

/// Handle `wtr prune`
pub fn handle_prune(env: &CommandEnv, yes: bool) -> anyhow::Result<ExitCode> {
    let stale = env.repo.find_stale_worktrees()?;
    if stale.is_empty() {
        eprintln!("{}", cformat!("{INFO_EMOJI} No stale worktrees found"));
        return Ok(nothing_to_do());
    }

    eprintln!("Found {} stale worktree(s):", stale.len());
    for (name, reason) in &stale {
        eprintln!("{}", cformat!("  <bold>{name}</> <dim>({reason})</>"));
    }
    if !yes && !confirm("Delete all?")? {
        eprintln!("Cancelled");
        return Ok(nothing_to_do());
    }

    let names: Vec<String> = stale.into_iter().map(|(name, _)| name).collect();
    let results = env.repo.prune_worktrees(&names);
    let pruned = results.values().filter(|r| r.is_ok()).count();
    let failures: Vec<(String, Error)> = results
        .into_iter()
        .filter_map(|(name, result)| result.err().map(|e| (name, e)))
        .collect();

    if failures.is_empty() {
        eprintln!(
            "{}",
            cformat!("{SUCCESS_EMOJI} <green>Pruned {pruned} worktree(s)</>")
        );
        return Ok(ExitCode::SUCCESS);
    }

    for (name, e) in &failures {
        eprintln!("{}", cformat!("{WARNING_EMOJI} <yellow><bold>{name}</>: {e}</>"));
    }
    if pruned == 0 {
        bail!("No worktrees pruned");
    }
    eprintln!("Pruned {pruned}, {} failed", failures.len());
    Ok(ExitCode::from(EXIT_FAILURE))
}
