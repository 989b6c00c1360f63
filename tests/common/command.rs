use crate::common::file::{FileSpec, write_file};
use assert_cmd::Command;
use assert_fs::TempDir;
use git_status_check::artifacts::check::alert::MemorySink;
use git_status_check::commands::check::{self, CheckOptions};
use git_status_check::{CheckError, Outcome};
use rstest::fixture;
use std::path::Path;

/// Environment the binary reads its options from
const ACTION_ENV: &[&str] = &[
    "GITHUB_ACTIONS",
    "GITHUB_OUTPUT",
    "GITHUB_SHA",
    "GITHUB_WORKSPACE",
    "INPUT_DIR",
    "INPUT_ALLOWED-CHANGES",
    "INPUT_IGNORE-NEW-FILES",
    "INPUT_CONTINUE-WITH-UNEXPECTED-CHANGES",
    "INPUT_RENDER",
    "INPUT_CONTEXT",
    "INPUT_BACKEND",
    "RUST_LOG",
];

pub const SCENARIO_CONTENT: &str = "Line 1\nLine 2\nLine 3\n";
pub const SCENARIO_MODIFIED: &str = "Line 1\nLine 3\nLine 4\n";

#[fixture]
pub fn repository_dir() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    run_git_command(dir.path(), &["init", "--quiet"])
        .assert()
        .success();
    dir
}

/// A repository whose single commit holds `a.txt` and a nested `dir/`
#[fixture]
pub fn committed_repository(repository_dir: TempDir) -> TempDir {
    write_file(FileSpec::new(
        repository_dir.path().join("a.txt"),
        SCENARIO_CONTENT.to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("dir").join("one.txt"),
        "one\n".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("dir").join("sub").join("two.txt"),
        "two\n".to_string(),
    ));

    git_commit_all(repository_dir.path(), "Initial commit");

    repository_dir
}

pub fn run_git_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::new("git");
    cmd.current_dir(dir)
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .env("GIT_CONFIG_GLOBAL", "/dev/null")
        .args([
            "-c",
            "user.name=Status Check",
            "-c",
            "user.email=status-check@example.com",
            "-c",
            "commit.gpgsign=false",
            "-c",
            "tag.gpgsign=false",
            "-c",
            "core.autocrlf=false",
        ])
        .args(args);
    cmd
}

pub fn git_commit_all(dir: &Path, message: &str) {
    run_git_command(dir, &["add", "--all"]).assert().success();
    run_git_command(dir, &["commit", "--quiet", "--allow-empty", "-m", message])
        .assert()
        .success();
}

pub fn git_output(dir: &Path, args: &[&str]) -> String {
    let output = run_git_command(dir, args).assert().success().get_output().clone();
    String::from_utf8(output.stdout)
        .expect("git printed invalid UTF-8")
        .trim()
        .to_string()
}

pub fn run_check_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("git-status-check").expect("Failed to find binary");
    for var in ACTION_ENV {
        cmd.env_remove(var);
    }
    cmd.current_dir(dir).args(args);
    cmd
}

/// Run the check in-process with default options on top of `configure`
pub async fn check_with(
    dir: &Path,
    configure: impl FnOnce(&mut CheckOptions),
) -> Result<(Outcome, MemorySink), CheckError> {
    let mut options = CheckOptions::new("HEAD".to_string(), dir.to_path_buf(), Vec::new(), false);
    configure(&mut options);

    let mut sink = MemorySink::default();
    let outcome = check::run(&options, &mut sink).await?;

    Ok((outcome, sink))
}

pub async fn check(dir: &Path) -> (Outcome, MemorySink) {
    check_with(dir, |_| {}).await.expect("check failed")
}
