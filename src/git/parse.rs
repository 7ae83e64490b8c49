//! Parsers for git's line-oriented output.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use super::{CommitInfo, MESSAGE_MAX_CHARS, SHORT_SHA_LEN, WorktreeEntry};

/// Field separator used in `--format` strings (ASCII unit separator).
pub(super) const FIELD_SEP: char = '\x1f';
/// Record separator used in `--format` strings (ASCII record separator).
pub(super) const RECORD_SEP: char = '\x1e';

/// Parse `git worktree list --porcelain`.
///
/// Unknown attributes are ignored for forward compatibility, and a stanza
/// without a path is dropped rather than failing the whole listing.
pub(super) fn parse_worktree_list(output: &str) -> Vec<WorktreeEntry> {
    let mut worktrees = Vec::new();
    let mut current: Option<WorktreeEntry> = None;

    for line in output.lines() {
        if line.is_empty() {
            if let Some(wt) = current.take() {
                worktrees.push(wt);
            }
            continue;
        }

        let (key, value) = match line.split_once(' ') {
            Some((k, v)) => (k, Some(v)),
            None => (line, None),
        };

        if key == "worktree" {
            if let Some(wt) = current.take() {
                worktrees.push(wt);
            }
            current = value.map(|path| WorktreeEntry {
                path: PathBuf::from(path),
                ..Default::default()
            });
            continue;
        }

        let Some(wt) = current.as_mut() else {
            continue;
        };

        match key {
            "HEAD" => wt.head = value.unwrap_or_default().to_string(),
            "branch" => {
                wt.branch = value.map(|r| r.strip_prefix("refs/heads/").unwrap_or(r).to_string())
            }
            "bare" => wt.bare = true,
            "detached" => wt.detached = true,
            "locked" => wt.locked = Some(value.unwrap_or_default().to_string()),
            "prunable" => wt.prunable = Some(value.unwrap_or_default().to_string()),
            _ => {}
        }
    }

    if let Some(wt) = current {
        worktrees.push(wt);
    }

    worktrees
}

/// Parse `git symbolic-ref --short refs/remotes/origin/HEAD` (e.g. `origin/main`).
///
/// Only a pointer into `origin/` is accepted.
pub(super) fn parse_remote_head(output: &str) -> Option<String> {
    output
        .trim()
        .strip_prefix("origin/")
        .filter(|branch| !branch.is_empty())
        .map(str::to_string)
}

/// Non-empty trimmed lines.
pub(super) fn parse_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// NUL-separated path lists (`-z` output), preserving names verbatim.
pub(super) fn parse_nul_separated(output: &str) -> Vec<String> {
    output
        .split('\0')
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Parse `git status --porcelain` into (tracked changes present, untracked count).
pub(super) fn parse_status_porcelain(output: &str) -> (bool, usize) {
    let mut dirty = false;
    let mut untracked = 0;
    for line in output.lines().filter(|l| !l.is_empty()) {
        if line.starts_with("??") {
            untracked += 1;
        } else if !line.starts_with("!!") {
            dirty = true;
        }
    }
    (dirty, untracked)
}

/// Parse `git rev-list --left-right --count <upstream>...<branch>` into (ahead, behind).
///
/// The left side counts upstream-only commits (behind), the right side
/// branch-only commits (ahead).
pub(super) fn parse_left_right_counts(output: &str) -> Option<(usize, usize)> {
    let mut parts = output.split_whitespace();
    let behind = parts.next()?.parse().ok()?;
    let ahead = parts.next()?.parse().ok()?;
    Some((ahead, behind))
}

pub(super) fn parse_timestamp(output: &str) -> Option<DateTime<Utc>> {
    let secs: i64 = output.trim().parse().ok()?;
    DateTime::from_timestamp(secs, 0)
}

/// Parse `git log --format=%H<US>%ct<US>%B<RS>`.
pub(super) fn parse_commit_log(output: &str) -> Vec<CommitInfo> {
    output
        .split(RECORD_SEP)
        .filter_map(|record| {
            let record = record.trim_start_matches('\n');
            if record.is_empty() {
                return None;
            }
            let mut fields = record.splitn(3, FIELD_SEP);
            let sha = fields.next()?;
            let time = parse_timestamp(fields.next()?)?;
            let body = fields.next().unwrap_or_default();
            Some(CommitInfo {
                sha: sha.chars().take(SHORT_SHA_LEN).collect(),
                message: first_line_truncated(body),
                time,
            })
        })
        .collect()
}

fn first_line_truncated(message: &str) -> String {
    message
        .lines()
        .next()
        .unwrap_or_default()
        .chars()
        .take(MESSAGE_MAX_CHARS)
        .collect()
}
