use crate::common::command::{check, committed_repository, git_commit_all, repository_dir};
use crate::common::file::write_generated_files;
use assert_fs::TempDir;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
#[tokio::test]
async fn report_nothing_when_no_files_are_changed(committed_repository: TempDir) {
    let (outcome, sink) = check(committed_repository.path()).await;

    assert_eq!(outcome.unexpected_changes, 0);
    assert!(sink.payloads.is_empty());
    assert!(sink.warnings.is_empty());
}

#[rstest]
#[tokio::test]
async fn report_nothing_for_many_committed_files(repository_dir: TempDir) {
    write_generated_files(repository_dir.path(), 25);
    git_commit_all(repository_dir.path(), "Generated files");

    let (outcome, sink) = check(repository_dir.path()).await;

    assert_eq!(outcome.unexpected_changes, 0);
    assert!(sink.payloads.is_empty());
}

#[rstest]
#[tokio::test]
async fn rewriting_identical_content_is_not_a_change(committed_repository: TempDir) {
    let path = committed_repository.path().join("a.txt");
    let content = std::fs::read(&path).unwrap();
    std::fs::write(&path, content).unwrap();

    let (outcome, _) = check(committed_repository.path()).await;

    assert_eq!(outcome.unexpected_changes, 0);
}
