use std::path::PathBuf;
use std::process::ExitCode;

use color_print::cformat;
use serde::Serialize;
use wtr::fuzzy;
use wtr::git::{BranchStatus, Error, Worktree};
use wtr::styling::{
    AHEAD, BEHIND, CURRENT, DIM, DIRTY, HINT_EMOJI, INFO_EMOJI, eprintln, paint, println,
};
use wtr::utils::format_time_ago;

use super::{CommandEnv, nothing_to_do};
use crate::OutputFormat;

#[derive(Debug, Serialize)]
struct ListItem {
    name: String,
    path: PathBuf,
    detached: bool,
    current: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<BranchStatus>,
}

/// Handle `wtr list`
pub fn handle_list(
    env: &CommandEnv,
    filter: Option<&str>,
    format: OutputFormat,
) -> anyhow::Result<ExitCode> {
    let repo = &env.repo;
    let worktrees = filter_worktrees(repo.worktrees(), filter);

    if worktrees.is_empty() {
        eprintln!("{}", cformat!("{INFO_EMOJI} No worktrees found"));
        return Ok(nothing_to_do());
    }

    let items: Vec<ListItem> = worktrees
        .into_iter()
        .map(|wt| ListItem {
            current: wt.path == repo.root(),
            status: env.config.ui.show_status.then(|| repo.branch_status(&wt.name)),
            name: wt.name,
            path: wt.path,
            detached: wt.detached,
        })
        .collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&items)?),
        OutputFormat::Text => {
            let width = items
                .iter()
                .map(|item| item.name.chars().count())
                .max()
                .unwrap_or_default();
            for item in &items {
                println!("{}", render_row(item, width));
            }
            if env.config.prune.auto_suggest {
                suggest_prune(env);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Keep the main-first listing order unless a filter ranks the names.
fn filter_worktrees(worktrees: Vec<Worktree>, filter: Option<&str>) -> Vec<Worktree> {
    let Some(query) = filter.filter(|q| !q.is_empty()) else {
        return worktrees;
    };
    let names: Vec<&str> = worktrees.iter().map(|wt| wt.name.as_str()).collect();
    let ranked = fuzzy::filter_names(&names, query, fuzzy::DEFAULT_THRESHOLD);
    ranked
        .iter()
        .filter_map(|name| worktrees.iter().find(|wt| &wt.name == name).cloned())
        .collect()
}

fn render_row(item: &ListItem, width: usize) -> String {
    let marker = if item.current { "@" } else { " " };
    let padded = format!("{:width$}", item.name);
    let name = paint(&padded, item.current.then_some(CURRENT));
    let detached = if item.detached {
        paint(" (detached)", Some(DIM))
    } else {
        String::new()
    };
    let status = item
        .status
        .as_ref()
        .map(status_summary)
        .filter(|s| !s.is_empty())
        .map(|s| format!("  {s}"))
        .unwrap_or_default();
    let path = paint(&item.path.display().to_string(), Some(DIM));
    format!("{marker} {name}{detached}{status}  {path}")
}

/// One-line summary: `* ?2 ↑1 ↓3 $ rebase 2h`. Empty for a clean branch
/// without a known commit time.
fn status_summary(status: &BranchStatus) -> String {
    let mut parts = Vec::new();
    if status.dirty {
        parts.push(paint("*", Some(DIRTY)));
    }
    if status.untracked_count > 0 {
        parts.push(paint(&format!("?{}", status.untracked_count), Some(DIRTY)));
    }
    if status.ahead > 0 {
        parts.push(paint(&format!("↑{}", status.ahead), Some(AHEAD)));
    }
    if status.behind > 0 {
        parts.push(paint(&format!("↓{}", status.behind), Some(BEHIND)));
    }
    if status.has_stash {
        parts.push("$".to_string());
    }
    if status.rebase_in_progress {
        parts.push(paint("rebase", Some(BEHIND)));
    }
    if status.merge_in_progress {
        parts.push(paint("merge", Some(BEHIND)));
    }
    let age = format_time_ago(status.last_commit_time);
    if !age.is_empty() {
        parts.push(paint(&age, Some(DIM)));
    }
    parts.join(" ")
}

fn suggest_prune(env: &CommandEnv) {
    match env.repo.find_stale_worktrees() {
        Ok(stale) if !stale.is_empty() => {
            let count = stale.len();
            eprintln!(
                "{}",
                cformat!("{HINT_EMOJI} <dim>{count} stale worktree(s); run <bold>wtr prune</> to remove</>")
            );
        }
        Ok(_) => {}
        Err(e) => log::debug!("stale check failed: {e}"),
    }
}

/// Handle `wtr status`
pub fn handle_status(env: &CommandEnv, name: &str) -> anyhow::Result<ExitCode> {
    let repo = &env.repo;
    let worktree = repo.list_worktrees().remove(name);
    if worktree.is_none() && !repo.branch_exists(name) {
        return Err(Error::NotFound(format!("Branch not found: {name}")).into());
    }

    let status = repo.branch_status(name);
    println!("{}", cformat!("<bold>{name}</>"));
    match &worktree {
        Some(path) => println!("  path:     {}", path.display()),
        None => println!("  path:     {}", paint("(no worktree)", Some(DIM))),
    }
    let summary = status_summary(&status);
    let summary = if summary.is_empty() { "clean".to_string() } else { summary };
    println!("  status:   {summary}");

    if env.config.ui.show_preview {
        let commits = repo.recent_commits(name, env.config.ui.preview_count);
        if !commits.is_empty() {
            println!("  commits:");
            for commit in commits {
                let age = format_time_ago(Some(commit.time));
                println!(
                    "    {} {} {}",
                    paint(&commit.sha, Some(DIRTY)),
                    commit.message,
                    paint(&age, Some(DIM))
                );
            }
        }
    }

    let files = repo.uncommitted_files(name);
    if !files.is_empty() {
        println!("  uncommitted:");
        for file in files {
            println!("    {file}");
        }
    }

    Ok(ExitCode::SUCCESS)
}
