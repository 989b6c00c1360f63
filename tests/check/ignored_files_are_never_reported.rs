use crate::common::command::{check, committed_repository, git_commit_all};
use crate::common::file::{FileSpec, write_file};
use assert_fs::TempDir;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
#[tokio::test]
async fn gitignored_new_files_are_not_reported(committed_repository: TempDir) {
    let root = committed_repository.path();
    write_file(FileSpec::new(root.join(".gitignore"), "*.log\nbuild/\n".to_string()));
    git_commit_all(root, "Ignore logs");

    write_file(FileSpec::new(root.join("debug.log"), "noise".to_string()));
    write_file(FileSpec::new(root.join("dir").join("trace.log"), "noise".to_string()));
    write_file(FileSpec::new(root.join("build").join("out.txt"), "artifact".to_string()));

    let (outcome, sink) = check(root).await;

    assert_eq!(outcome.unexpected_changes, 0);
    assert!(sink.payloads.is_empty());
}

#[rstest]
#[tokio::test]
async fn info_exclude_is_honoured(committed_repository: TempDir) {
    let root = committed_repository.path();
    write_file(FileSpec::new(
        root.join(".git").join("info").join("exclude"),
        "local.env\n".to_string(),
    ));
    write_file(FileSpec::new(root.join("local.env"), "SECRET=1".to_string()));

    let (outcome, _) = check(root).await;

    assert_eq!(outcome.unexpected_changes, 0);
}

#[rstest]
#[tokio::test]
async fn tracked_files_matching_ignore_rules_are_still_checked(committed_repository: TempDir) {
    let root = committed_repository.path();
    write_file(FileSpec::new(root.join(".gitignore"), "*.txt\n".to_string()));
    git_commit_all(root, "Ignore text files");

    write_file(FileSpec::new(root.join("a.txt"), "changed\n".to_string()));
    write_file(FileSpec::new(root.join("new.txt"), "ignored\n".to_string()));

    let (outcome, sink) = check(root).await;

    assert_eq!(outcome.unexpected_changes, 1);
    assert_eq!(sink.files(), vec!["a.txt"]);
}

#[rstest]
#[tokio::test]
async fn nested_repositories_are_skipped(committed_repository: TempDir) {
    let nested = committed_repository.path().join("vendor").join("lib");
    write_file(FileSpec::new(nested.join(".git").join("HEAD"), "ref: refs/heads/main\n".to_string()));
    write_file(FileSpec::new(nested.join("lib.rs"), "fn main() {}\n".to_string()));

    let (outcome, _) = check(committed_repository.path()).await;

    assert_eq!(outcome.unexpected_changes, 0);
}
