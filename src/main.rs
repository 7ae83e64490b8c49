use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use color_print::cformat;
use wtr::styling::{ERROR_EMOJI, eprintln};

mod commands;

#[derive(Parser)]
#[command(name = "wtr", version)]
#[command(about = "Git worktree manager for container-layout repositories", long_about = None)]
struct Cli {
    /// Run as if started in PATH
    #[arg(short = 'C', global = true, value_name = "PATH")]
    directory: Option<PathBuf>,

    /// Log every git command with its duration
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List worktrees
    List {
        /// Only show worktrees matching QUERY (fuzzy)
        #[arg(long, value_name = "QUERY")]
        filter: Option<String>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print the path of an existing worktree
    Switch {
        /// Branch (or directory name, for detached worktrees)
        name: String,
    },

    /// Create a worktree
    Add {
        /// Branch and directory name (defaults to the commit's first 7 characters with -c)
        name: Option<String>,

        /// Base branch for a new branch
        #[arg(short, long, value_name = "BRANCH", conflicts_with = "commit")]
        base: Option<String>,

        /// Check out a commit or tag (detached unless -B)
        #[arg(short, long, value_name = "COMMIT")]
        commit: Option<String>,

        /// Create a new branch at the commit
        #[arg(short = 'B', long = "new-branch", requires = "commit")]
        new_branch: bool,
    },

    /// Remove a worktree (the branch is kept)
    Delete { name: String },

    /// Remove worktrees whose branch was deleted or merged into the main branch
    Prune {
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Show status, recent commits, and uncommitted files of a branch
    Status { name: String },

    /// Move the current checkout into container layout
    Restructure {
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            if let Some(err) = e.downcast_ref::<wtr::Error>() {
                log::debug!("{} error", err.kind());
            }
            eprintln!("{}", cformat!("{ERROR_EMOJI} <red>{e:#}</>"));
            commands::exit_code_for(&e)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let env = commands::CommandEnv::load(cli.directory.as_deref())?;

    match cli.command {
        Commands::List { filter, format } => {
            commands::list::handle_list(&env, filter.as_deref(), format)
        }
        Commands::Switch { name } => commands::lifecycle::handle_switch(&env, &name),
        Commands::Add {
            name,
            base,
            commit,
            new_branch,
        } => commands::lifecycle::handle_add(&env, name, base, commit, new_branch),
        Commands::Delete { name } => commands::lifecycle::handle_delete(&env, &name),
        Commands::Prune { yes } => commands::lifecycle::handle_prune(&env, yes),
        Commands::Status { name } => commands::list::handle_status(&env, &name),
        Commands::Restructure { yes } => commands::restructure::handle_restructure(&env, yes),
    }
}

/// `warn` by default, `debug` with `-v`; `RUST_LOG` applies when `-v` is absent.
fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}
