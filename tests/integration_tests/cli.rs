//! End-to-end runs of the `wtr` binary.

use std::fs;

use crate::common::{TestRepo, run};

/// Replace the temporary directory so output is stable across runs.
fn scrub(repo: &TestRepo, output: &str) -> String {
    output.replace(repo.base().to_str().unwrap(), "[TMP]")
}

#[test]
fn test_list_text() {
    let repo = TestRepo::new();
    repo.add_worktree("feature");

    let mut cmd = repo.wtr_command();
    cmd.arg("list");
    let (code, stdout, stderr) = run(cmd);

    assert_eq!(code, 0, "{stderr}");
    insta::assert_snapshot!(scrub(&repo, &stdout), @r"
    @ main     1h  [TMP]/project/main
      feature  1h  [TMP]/project/feature
    ");
    // feature sits on main's tip, so it counts as merged
    assert!(stderr.contains("1 stale worktree(s)"), "{stderr}");
}

#[test]
fn test_list_json_and_filter() {
    let repo = TestRepo::new();
    repo.add_worktree("feature-auth");
    repo.add_worktree("bugfix");

    let mut cmd = repo.wtr_command();
    cmd.args(["list", "--format", "json", "--filter", "auth"]);
    let (code, stdout, stderr) = run(cmd);
    assert_eq!(code, 0, "{stderr}");

    let items: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let items = items.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "feature-auth");
    assert_eq!(items[0]["current"], false);
    assert_eq!(items[0]["status"]["dirty"], false);

    let mut cmd = repo.wtr_command();
    cmd.args(["list", "--filter", "zzz"]);
    let (code, stdout, _) = run(cmd);
    assert_eq!(code, 1);
    assert!(stdout.is_empty());
}

#[test]
fn test_switch_prints_path_or_suggests() {
    let repo = TestRepo::new();
    let feature = repo.add_worktree("feature");

    let mut cmd = repo.wtr_command();
    cmd.args(["switch", "feature"]);
    let (code, stdout, _) = run(cmd);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), feature.to_str().unwrap());

    let mut cmd = repo.wtr_command();
    cmd.args(["switch", "featur"]);
    let (code, stdout, stderr) = run(cmd);
    assert_eq!(code, 1);
    assert!(stdout.is_empty());
    insta::assert_snapshot!(stderr, @r"
    💡 Did you mean: feature
    ❌ Worktree 'featur' does not exist
    ");

    let mut cmd = repo.wtr_command();
    cmd.args(["switch", "qqq"]);
    let (code, _, stderr) = run(cmd);
    assert_eq!(code, 1);
    insta::assert_snapshot!(stderr, @r"
    💡 Available: feature, main
    ❌ Worktree 'qqq' does not exist
    ");
}

#[test]
fn test_add_and_delete() {
    let repo = TestRepo::new();

    let mut cmd = repo.wtr_command();
    cmd.args(["add", "feature"]);
    let (code, stdout, stderr) = run(cmd);
    assert_eq!(code, 0, "{stderr}");
    let path = repo.container().join("feature");
    assert_eq!(stdout.trim(), path.to_str().unwrap());
    assert!(stderr.contains("Created worktree feature"), "{stderr}");
    assert!(path.join("file.txt").exists());

    // Adding it again is a user error
    let mut cmd = repo.wtr_command();
    cmd.args(["add", "feature"]);
    let (code, _, stderr) = run(cmd);
    assert_eq!(code, 1);
    assert!(stderr.contains("already exists"), "{stderr}");

    let mut cmd = repo.wtr_command();
    cmd.args(["delete", "feature"]);
    let (code, _, stderr) = run(cmd);
    assert_eq!(code, 0, "{stderr}");
    assert!(!path.exists());

    let mut cmd = repo.wtr_command();
    cmd.args(["delete", "feature"]);
    let (code, _, _) = run(cmd);
    assert_eq!(code, 1);
}

#[test]
fn test_add_from_commit_uses_short_name() {
    let repo = TestRepo::new();
    let head = repo.head_of("HEAD");

    let mut cmd = repo.wtr_command();
    cmd.args(["add", "-c", &head]);
    let (code, stdout, stderr) = run(cmd);
    assert_eq!(code, 0, "{stderr}");

    let path = repo.container().join(&head[..7]);
    assert_eq!(stdout.trim(), path.to_str().unwrap());
    assert_eq!(repo.git_in(&path, &["rev-parse", "HEAD"]), head);
}

#[test]
fn test_add_argument_errors() {
    let repo = TestRepo::new();

    // Argument conflicts are rejected by the parser
    let mut cmd = repo.wtr_command();
    cmd.args(["add", "x", "-B"]);
    let (code, _, _) = run(cmd);
    assert_eq!(code, 2);

    let mut cmd = repo.wtr_command();
    cmd.args(["add", "x", "-b", "main", "-c", "HEAD"]);
    let (code, _, _) = run(cmd);
    assert_eq!(code, 2);

    // Neither a name nor a commit
    let mut cmd = repo.wtr_command();
    cmd.arg("add");
    let (code, _, stderr) = run(cmd);
    assert_eq!(code, 1);
    assert!(stderr.contains("name is required"), "{stderr}");

    // Unknown base fails in git
    let mut cmd = repo.wtr_command();
    cmd.args(["add", "x", "-b", "no-such-branch"]);
    let (code, _, _) = run(cmd);
    assert_eq!(code, 2);
    assert!(!repo.container().join("x").exists());
}

#[test]
fn test_add_requires_container_layout() {
    let repo = TestRepo::plain("myproject");
    let mut cmd = repo.wtr_command();
    cmd.args(["add", "feature"]);
    let (code, _, stderr) = run(cmd);
    assert_eq!(code, 2);
    assert!(stderr.contains("wtr restructure"), "{stderr}");
}

#[test]
fn test_prune() {
    let repo = TestRepo::new();
    let done = repo.add_worktree("done");
    let open = repo.add_worktree("open");
    repo.commit_in(&open, "open work");

    let mut cmd = repo.wtr_command();
    cmd.args(["prune", "--yes"]);
    let (code, stdout, stderr) = run(cmd);
    assert_eq!(code, 0, "{stderr}");
    assert!(stdout.is_empty());
    insta::assert_snapshot!(stderr, @r"
    Found 1 stale worktree(s):
      done (merged to main)
    ✅ Pruned 1 worktree(s)
    ");
    assert!(!done.exists());
    assert!(open.exists());

    let mut cmd = repo.wtr_command();
    cmd.args(["prune", "--yes"]);
    let (code, _, stderr) = run(cmd);
    assert_eq!(code, 1);
    insta::assert_snapshot!(stderr, @"⚪ No stale worktrees found");
}

#[test]
fn test_prune_declined_without_input() {
    let repo = TestRepo::new();
    let done = repo.add_worktree("done");

    let mut cmd = repo.wtr_command();
    cmd.arg("prune").stdin(std::process::Stdio::null());
    let (code, _, stderr) = run(cmd);
    assert_eq!(code, 1);
    assert!(stderr.contains("Cancelled"), "{stderr}");
    assert!(done.exists());
}

#[test]
fn test_status() {
    let repo = TestRepo::new();
    let feature = repo.add_worktree("feature");
    repo.commit_in(&feature, "feature work");
    fs::write(feature.join("notes.txt"), "draft").unwrap();

    let mut cmd = repo.wtr_command();
    cmd.args(["status", "feature"]);
    let (code, stdout, stderr) = run(cmd);
    assert_eq!(code, 0, "{stderr}");
    // Commit hashes are stable but opaque; name them by branch
    let stdout = scrub(&repo, &stdout)
        .replace(&repo.head_of("feature")[..7], "[FEATURE]")
        .replace(&repo.head_of("main")[..7], "[MAIN]");
    insta::assert_snapshot!(stdout, @r"
    feature
      path:     [TMP]/project/feature
      status:   ?1 1h
      commits:
        [FEATURE] feature work 1h
        [MAIN] initial commit 1h
      uncommitted:
        notes.txt
    ");

    let mut cmd = repo.wtr_command();
    cmd.args(["status", "nope"]);
    let (code, _, stderr) = run(cmd);
    assert_eq!(code, 1);
    insta::assert_snapshot!(stderr, @"❌ Branch not found: nope");
}

#[test]
fn test_restructure() {
    let repo = TestRepo::plain("myproject");

    let mut cmd = repo.wtr_command();
    cmd.args(["restructure", "--yes"]);
    let (code, stdout, stderr) = run(cmd);
    assert_eq!(code, 0, "{stderr}");
    let new_root = repo.base().join("myproject").join("main");
    assert_eq!(stdout.trim(), new_root.to_str().unwrap());

    let mut cmd = repo.wtr_command_in(&new_root);
    cmd.args(["restructure", "--yes"]);
    let (code, _, stderr) = run(cmd);
    assert_eq!(code, 1);
    assert!(stderr.contains("Already in worktree structure"), "{stderr}");
}

#[test]
fn test_ignores_inherited_git_dir() {
    let repo = TestRepo::new();
    repo.add_worktree("feature");

    // As when run from inside a git hook of some other repository
    let mut cmd = repo.wtr_command();
    cmd.args(["switch", "feature"])
        .env("GIT_DIR", repo.base().join("elsewhere.git"))
        .env("GIT_WORK_TREE", repo.base());
    let (code, stdout, stderr) = run(cmd);
    assert_eq!(code, 0, "{stderr}");
    assert_eq!(
        stdout.trim(),
        repo.container().join("feature").to_str().unwrap()
    );
}

#[test]
fn test_outside_repository() {
    let repo = TestRepo::new();
    let outside = repo.base().join("elsewhere");
    fs::create_dir(&outside).unwrap();

    let mut cmd = repo.wtr_command_in(&outside);
    cmd.arg("list");
    let (code, _, stderr) = run(cmd);
    assert_eq!(code, 1);
    assert!(stderr.contains("❌"), "{stderr}");

    // -C points back into the repository
    let mut cmd = repo.wtr_command_in(&outside);
    cmd.arg("-C").arg(repo.root_path()).args(["switch", "main"]);
    let (code, stdout, _) = run(cmd);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), repo.root_path().to_str().unwrap());
}

#[test]
fn test_default_base_from_file_and_environment() {
    let repo = TestRepo::new();
    repo.git(&["branch", "develop"]);
    repo.git(&["branch", "release"]);
    repo.commit("main moves on");
    fs::write(
        repo.root_path().join(".wtrrc"),
        "[worktree]\ndefault_base = \"develop\"\n",
    )
    .unwrap();

    let mut cmd = repo.wtr_command();
    cmd.args(["add", "from-file"]);
    let (code, _, stderr) = run(cmd);
    assert_eq!(code, 0, "{stderr}");
    assert_eq!(repo.head_of("from-file"), repo.head_of("develop"));

    let mut cmd = repo.wtr_command();
    cmd.args(["add", "from-env"])
        .env("WTR_WORKTREE__DEFAULT_BASE", "release");
    let (code, _, stderr) = run(cmd);
    assert_eq!(code, 0, "{stderr}");
    assert_eq!(repo.head_of("from-env"), repo.head_of("release"));
    assert_ne!(repo.head_of("from-env"), repo.head_of("main"));
}

#[test]
fn test_help() {
    let repo = TestRepo::new();
    let mut cmd = repo.wtr_command();
    cmd.arg("--help");
    let (code, stdout, _) = run(cmd);
    assert_eq!(code, 0);
    for subcommand in ["list", "switch", "add", "delete", "prune", "status", "restructure"] {
        assert!(stdout.contains(subcommand), "{stdout}");
    }
}
