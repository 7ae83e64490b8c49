//! Command handlers for the `wtr` binary.
//!
//! Paths meant for a shell wrapper (`cd "$(wtr switch x)"`) go to stdout;
//! every message goes to stderr.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use color_print::cformat;
use wtr::config::WtrConfig;
use wtr::git::{Error, Repository};
use wtr::styling::{PROMPT_EMOJI, eprintln};

pub mod lifecycle;
pub mod list;
pub mod restructure;

/// Exit status when there was nothing to do or the user has something to fix.
pub const EXIT_USER: u8 = 1;
/// Exit status when an operation failed.
pub const EXIT_FAILURE: u8 = 2;

/// Repository and configuration shared by all handlers.
pub struct CommandEnv {
    pub repo: Repository,
    pub config: WtrConfig,
}

impl CommandEnv {
    /// Discover the repository from `directory` (or the working directory)
    /// and load its configuration.
    pub fn load(directory: Option<&Path>) -> anyhow::Result<Self> {
        let start = match directory {
            Some(dir) => dir.to_path_buf(),
            None => std::env::current_dir().context("Failed to get current directory")?,
        };
        let repo = Repository::discover(&start)?;
        let config = WtrConfig::load(Some(repo.root()));
        let repo = match config.default_base() {
            Some(base) => repo.with_default_base(base),
            None => repo,
        };
        Ok(Self { repo, config })
    }
}

pub fn nothing_to_do() -> ExitCode {
    ExitCode::from(EXIT_USER)
}

/// Map a failed command to its exit status.
///
/// Invalid arguments and unknown names are the user's to fix; everything
/// else is an operation failure.
pub fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<Error>() {
        Some(Error::Validation(_) | Error::NotFound(_)) => ExitCode::from(EXIT_USER),
        _ => ExitCode::from(EXIT_FAILURE),
    }
}

/// Ask a yes/no question on stderr. Anything but `y`/`yes` declines,
/// including end of input.
pub fn confirm(question: &str) -> io::Result<bool> {
    let mut stderr = io::stderr();
    write!(stderr, "{}", cformat!("{PROMPT_EMOJI} {question} <dim>[y/N]</> "))?;
    stderr.flush()?;

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer)? == 0 {
        eprintln!();
        return Ok(false);
    }
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
