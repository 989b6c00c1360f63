use crate::common::command::{check_with, committed_repository, run_git_command};
use crate::common::file::delete_path;
use assert_fs::TempDir;
use git_status_check::backend::BackendKind;
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::path::Path;
use std::process::Command;

fn make_fifo(path: &Path) {
    let status = Command::new("mkfifo")
        .arg(path)
        .status()
        .expect("Failed to run mkfifo");
    assert!(status.success(), "mkfifo {path:?} failed");
}

#[rstest]
#[tokio::test]
async fn untracked_fifos_are_not_reported(committed_repository: TempDir) {
    let root = committed_repository.path();
    make_fifo(&root.join("pipe"));
    make_fifo(&root.join("dir").join("sub").join("pipe"));

    let git_status = run_git_command(root, &["status", "--porcelain"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert!(git_status.is_empty());

    for backend in [BackendKind::Native, BackendKind::Git] {
        let (outcome, sink) = check_with(root, |options| options.backend = backend)
            .await
            .unwrap();

        assert_eq!(outcome.unexpected_changes, 0, "{backend:?}");
        assert!(sink.payloads.is_empty(), "{backend:?}");
        assert!(outcome.content_failures.is_empty(), "{backend:?}");
    }
}

#[rstest]
#[tokio::test]
async fn tracked_file_replaced_by_a_fifo_is_reported_deleted(committed_repository: TempDir) {
    let root = committed_repository.path();
    delete_path(&root.join("a.txt"));
    make_fifo(&root.join("a.txt"));

    let (outcome, sink) = check_with(root, |options| options.backend = BackendKind::Native)
        .await
        .unwrap();

    assert_eq!(outcome.unexpected_changes, 1);
    assert_eq!(sink.files(), vec!["a.txt"]);
    assert!(sink.messages()[0].starts_with("File deleted:\n"));
    assert!(outcome.content_failures.is_empty());
}
