use crate::common::command::{check, committed_repository};
use crate::common::file::{FileSpec, delete_path, write_file};
use assert_fs::TempDir;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
#[tokio::test]
async fn report_every_file_of_a_deleted_directory(committed_repository: TempDir) {
    delete_path(&committed_repository.path().join("dir"));

    let (outcome, sink) = check(committed_repository.path()).await;

    assert_eq!(outcome.unexpected_changes, 2);
    assert_eq!(sink.files(), vec!["dir/one.txt", "dir/sub/two.txt"]);
    assert_eq!(
        sink.messages(),
        vec!["File deleted:\none\n", "File deleted:\ntwo\n"]
    );
}

#[rstest]
#[tokio::test]
async fn a_file_replaced_by_a_directory_is_deleted_and_its_contents_added(
    committed_repository: TempDir,
) {
    delete_path(&committed_repository.path().join("a.txt"));
    write_file(FileSpec::new(
        committed_repository.path().join("a.txt").join("inner.txt"),
        "inner\n".to_string(),
    ));

    let (outcome, sink) = check(committed_repository.path()).await;

    assert_eq!(outcome.unexpected_changes, 2);
    assert_eq!(
        sink.groups,
        vec!["a.txt --- file deleted", "a.txt/inner.txt --- file added"]
    );
}
