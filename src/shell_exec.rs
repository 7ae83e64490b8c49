//! External command execution
//!
//! Every process the library spawns goes through [`Cmd`], so all of them get
//! the same debug logging: the command line before it runs, and a trace line
//! with duration and outcome after it finishes.
//!
//! Execution is blocking. There is no timeout: a slow `git` call (an ancestor
//! check over a long history, say) runs until it completes or fails.

use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::time::Instant;

/// Builder for executing commands with logging and tracing.
///
/// # Examples
///
/// ```no_run
/// use wtr::shell_exec::Cmd;
///
/// let output = Cmd::new("git")
///     .args(["status", "--porcelain"])
///     .current_dir("/tmp/project/main")
///     .context("main")
///     .run()?;
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Cmd {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    context: Option<String>,
    envs: Vec<(String, String)>,
    env_removes: Vec<String>,
}

impl Cmd {
    /// Create a new command builder for the given program.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            context: None,
            envs: Vec::new(),
            env_removes: Vec::new(),
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the working directory for the command.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Set the logging context (typically the worktree name for git commands).
    pub fn context(mut self, ctx: impl Into<String>) -> Self {
        self.context = Some(ctx.into());
        self
    }

    /// Set an environment variable.
    pub fn env(mut self, key: impl Into<String>, val: impl Into<String>) -> Self {
        self.envs.push((key.into(), val.into()));
        self
    }

    /// Remove an environment variable.
    pub fn env_remove(mut self, key: impl Into<String>) -> Self {
        self.env_removes.push(key.into());
        self
    }

    /// The command line as it appears in logs.
    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }

    /// Execute the command, capturing stdout and stderr.
    ///
    /// Stdin is closed so a command that unexpectedly prompts fails instead
    /// of hanging.
    pub fn run(self) -> std::io::Result<Output> {
        let cmd_str = self.display();

        match &self.context {
            Some(ctx) => log::debug!("$ {} [{}]", cmd_str, ctx),
            None => log::debug!("$ {}", cmd_str),
        }

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).stdin(Stdio::null());

        if let Some(ref dir) = self.current_dir {
            cmd.current_dir(dir);
        }
        for (key, val) in &self.envs {
            cmd.env(key, val);
        }
        for key in &self.env_removes {
            cmd.env_remove(key);
        }

        let t0 = Instant::now();
        let result = cmd.output();
        let dur_us = t0.elapsed().as_micros();
        let ctx = self.context.as_deref().unwrap_or("-");

        match &result {
            Ok(output) => log::debug!(
                "[wtr-trace] context={} cmd=\"{}\" dur_us={} ok={}",
                ctx,
                cmd_str,
                dur_us,
                output.status.success()
            ),
            Err(e) => log::debug!(
                "[wtr-trace] context={} cmd=\"{}\" dur_us={} err=\"{}\"",
                ctx,
                cmd_str,
                dur_us,
                e
            ),
        }

        result
    }
}
