use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use insta_cmd::get_cargo_bin;
use tempfile::TempDir;
use wtr::Repository;

/// Fixed commit date so timestamps in assertions are stable (2025-01-01T00:00:00Z).
pub const COMMIT_EPOCH: i64 = 1_735_689_600;

const GIT_ENV: &[(&str, &str)] = &[
    ("GIT_CONFIG_GLOBAL", "/dev/null"),
    ("GIT_CONFIG_SYSTEM", "/dev/null"),
    ("GIT_AUTHOR_NAME", "Test User"),
    ("GIT_AUTHOR_EMAIL", "test@example.com"),
    ("GIT_COMMITTER_NAME", "Test User"),
    ("GIT_COMMITTER_EMAIL", "test@example.com"),
    ("GIT_AUTHOR_DATE", "2025-01-01T00:00:00Z"),
    ("GIT_COMMITTER_DATE", "2025-01-01T00:00:00Z"),
    ("LC_ALL", "C"),
    ("LANG", "C"),
];

/// A real git repository in a temporary directory.
///
/// The default layout is a container (`<tmp>/project`) whose main checkout
/// lives at `<tmp>/project/main`. Git is configured per command, so tests can
/// run in parallel without touching the process environment.
pub struct TestRepo {
    temp_dir: TempDir,
    root: PathBuf,
}

impl TestRepo {
    /// Repository in container layout with one commit on `main`.
    pub fn new() -> Self {
        Self::init(Path::new("project").join("main"))
    }

    /// Ordinary single-checkout repository at `<tmp>/<name>`.
    pub fn plain(name: &str) -> Self {
        Self::init(PathBuf::from(name))
    }

    fn init(relative_root: PathBuf) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        // Canonicalize to resolve symlinks (important on macOS where /var is symlink to /private/var)
        let base = dunce::canonicalize(temp_dir.path()).expect("Failed to canonicalize temp path");
        let root = base.join(relative_root);
        fs::create_dir_all(&root).expect("Failed to create repo directory");

        let repo = Self { temp_dir, root };
        repo.git(&["init", "-b", "main"]);
        repo.git(&["config", "user.name", "Test User"]);
        repo.git(&["config", "user.email", "test@example.com"]);
        repo.commit("initial commit");
        repo
    }

    pub fn root_path(&self) -> &Path {
        &self.root
    }

    /// Directory holding the checkouts.
    pub fn container(&self) -> PathBuf {
        self.root
            .parent()
            .expect("root has a parent")
            .to_path_buf()
    }

    /// Canonical temporary directory everything lives under.
    pub fn base(&self) -> PathBuf {
        dunce::canonicalize(self.temp_dir.path()).expect("Failed to canonicalize temp path")
    }

    /// Library handle on the main checkout.
    pub fn repository(&self) -> Repository {
        Repository::discover(&self.root).expect("Failed to discover repository")
    }

    /// Run git in the main checkout, returning trimmed stdout.
    pub fn git(&self, args: &[&str]) -> String {
        self.git_in(&self.root, args)
    }

    /// Run git in `dir`, panicking with its output on failure.
    pub fn git_in(&self, dir: &Path, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(dir)
            .envs(GIT_ENV.iter().copied())
            .output()
            .expect("Failed to execute git");
        if !output.status.success() {
            panic!(
                "git {} failed:\nstdout: {}\nstderr: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// Commit a change to `file.txt` in the main checkout.
    pub fn commit(&self, message: &str) {
        self.commit_in(&self.root, message);
    }

    /// Commit a change to `file.txt` in `dir`.
    pub fn commit_in(&self, dir: &Path, message: &str) {
        fs::write(dir.join("file.txt"), message).expect("Failed to write file");
        self.git_in(dir, &["add", "."]);
        self.git_in(dir, &["commit", "-m", message]);
    }

    /// Add a linked worktree on a new branch at `<container>/<branch>`.
    pub fn add_worktree(&self, branch: &str) -> PathBuf {
        let path = self.container().join(branch);
        self.git(&["worktree", "add", "-b", branch, path.to_str().unwrap()]);
        path
    }

    /// Add a detached worktree at `<container>/<dir_name>`.
    pub fn add_detached_worktree(&self, dir_name: &str, commit: &str) -> PathBuf {
        let path = self.container().join(dir_name);
        self.git(&["worktree", "add", "--detach", path.to_str().unwrap(), commit]);
        path
    }

    pub fn head_of(&self, rev: &str) -> String {
        self.git(&["rev-parse", rev])
    }

    /// `wtr` binary set up to run in the main checkout with an isolated
    /// home directory and git configuration.
    pub fn wtr_command(&self) -> Command {
        self.wtr_command_in(&self.root)
    }

    pub fn wtr_command_in(&self, dir: &Path) -> Command {
        let mut cmd = Command::new(get_cargo_bin("wtr"));
        cmd.current_dir(dir)
            .envs(GIT_ENV.iter().copied())
            .env("HOME", self.base())
            .env("SOURCE_DATE_EPOCH", (COMMIT_EPOCH + 3_600).to_string())
            .env_remove("RUST_LOG")
            .env_remove("CLICOLOR_FORCE")
            .env_remove("WTR_WORKTREE__DEFAULT_BASE");
        cmd
    }
}

/// Run a command and return (exit code, stdout, stderr).
pub fn run(mut cmd: Command) -> (i32, String, String) {
    let output = cmd.output().expect("Failed to run command");
    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).into_owned(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
    )
}
