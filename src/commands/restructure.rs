use std::process::ExitCode;

use color_print::cformat;
use wtr::git::Error;
use wtr::styling::{INFO_EMOJI, PROGRESS_EMOJI, SUCCESS_EMOJI, eprintln, println};

use super::{CommandEnv, confirm, nothing_to_do};

/// Handle `wtr restructure`
///
/// Prints the new root on stdout so a shell wrapper can follow the move.
pub fn handle_restructure(env: &CommandEnv, yes: bool) -> anyhow::Result<ExitCode> {
    let repo = &env.repo;
    if repo.is_valid_structure() {
        eprintln!(
            "{}",
            cformat!("{INFO_EMOJI} Already in worktree structure")
        );
        return Ok(nothing_to_do());
    }

    let main_branch = repo.main_branch();
    if !repo.needs_restructure() {
        return Err(Error::Validation(format!(
            "Check out '{main_branch}' in {} before restructuring",
            repo.root().display()
        ))
        .into());
    }

    let question = cformat!(
        "Move <bold>{}</> to <bold>{}</>?",
        repo.root().display(),
        repo.root().join(&main_branch).display()
    );
    if !yes && !confirm(&question)? {
        eprintln!("Worktree operations require the container layout.");
        return Ok(nothing_to_do());
    }

    eprintln!(
        "{}",
        cformat!("{PROGRESS_EMOJI} <cyan>Restructuring...</>")
    );
    let restructured = repo.restructure()?;
    eprintln!(
        "{}",
        cformat!(
            "{SUCCESS_EMOJI} <green>Restructured: <bold>{}</></>",
            restructured.root().display()
        )
    );
    println!("{}", restructured.root().display());
    Ok(ExitCode::SUCCESS)
}
