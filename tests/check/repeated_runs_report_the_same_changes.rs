use crate::common::command::{check, committed_repository};
use crate::common::file::{FileSpec, delete_path, write_file, write_generated_files};
use assert_fs::TempDir;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
#[tokio::test]
async fn repeated_runs_report_the_same_changes(committed_repository: TempDir) {
    let root = committed_repository.path();
    write_generated_files(&root.join("generated"), 5);
    write_file(FileSpec::new(root.join("a.txt"), "rewritten\n".to_string()));
    delete_path(&root.join("dir").join("one.txt"));

    let (first, first_sink) = check(root).await;
    let (second, second_sink) = check(root).await;

    assert_eq!(first.unexpected_changes, 7);
    assert_eq!(first.unexpected_changes, second.unexpected_changes);
    assert_eq!(first_sink.payloads, second_sink.payloads);
    assert_eq!(first_sink.groups, second_sink.groups);
}

#[rstest]
#[tokio::test]
async fn the_check_never_touches_the_index(committed_repository: TempDir) {
    let root = committed_repository.path();
    write_file(FileSpec::new(root.join("a.txt"), "rewritten\n".to_string()));
    let index_before = std::fs::read(root.join(".git").join("index")).unwrap();

    check(root).await;

    let index_after = std::fs::read(root.join(".git").join("index")).unwrap();
    assert_eq!(index_before, index_after);
}
