use crate::common::command::{check, check_with, committed_repository, run_git_command};
use crate::common::file::{FileSpec, write_file};
use assert_fs::TempDir;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
#[tokio::test]
async fn report_an_untracked_file_with_its_content(committed_repository: TempDir) {
    write_file(FileSpec::new(
        committed_repository.path().join("b.txt"),
        "Extra file".to_string(),
    ));

    let (outcome, sink) = check(committed_repository.path()).await;

    assert_eq!(outcome.unexpected_changes, 1);
    assert_eq!(sink.files(), vec!["b.txt"]);
    assert_eq!(sink.messages(), vec!["File added:\nExtra file"]);
    assert_eq!(sink.payloads[0].properties.title, "Unexpected file added");
    assert_eq!(sink.groups, vec!["b.txt --- file added"]);
}

#[rstest]
#[tokio::test]
async fn report_a_staged_file_once(committed_repository: TempDir) {
    write_file(FileSpec::new(
        committed_repository.path().join("new").join("staged.txt"),
        "staged\n".to_string(),
    ));
    run_git_command(committed_repository.path(), &["add", "new/staged.txt"])
        .assert()
        .success();

    let (outcome, sink) = check(committed_repository.path()).await;

    assert_eq!(outcome.unexpected_changes, 1);
    assert_eq!(sink.files(), vec!["new/staged.txt"]);
}

#[rstest]
#[tokio::test]
async fn ignore_new_files_when_asked(committed_repository: TempDir) {
    write_file(FileSpec::new(
        committed_repository.path().join("b.txt"),
        "Extra file".to_string(),
    ));
    write_file(FileSpec::new(
        committed_repository.path().join("a.txt"),
        "changed\n".to_string(),
    ));

    let (outcome, sink) = check_with(committed_repository.path(), |options| {
        options.ignore_new_files = true;
    })
    .await
    .unwrap();

    assert_eq!(outcome.unexpected_changes, 1);
    assert_eq!(sink.files(), vec!["a.txt"]);
}

#[rstest]
#[tokio::test]
async fn binary_files_are_reported_without_content(committed_repository: TempDir) {
    std::fs::write(
        committed_repository.path().join("image.bin"),
        [0x89, b'P', b'N', b'G', 0, 0, 1],
    )
    .unwrap();

    let (outcome, sink) = check(committed_repository.path()).await;

    assert_eq!(outcome.unexpected_changes, 1);
    assert_eq!(outcome.content_failures.len(), 1);
    assert_eq!(
        sink.messages(),
        vec!["File added:\n(content unavailable: binary content (7 bytes))"]
    );
}

#[rstest]
#[tokio::test]
async fn report_each_file_of_an_untracked_directory(committed_repository: TempDir) {
    let new_dir = committed_repository.path().join("newdir");
    write_file(FileSpec::new(new_dir.join("a.txt"), "a\n".to_string()));
    write_file(FileSpec::new(new_dir.join("nested").join("b.txt"), "b\n".to_string()));

    let (outcome, sink) = check(committed_repository.path()).await;

    assert_eq!(outcome.unexpected_changes, 2);
    assert_eq!(sink.files(), vec!["newdir/a.txt", "newdir/nested/b.txt"]);
    assert_eq!(sink.messages(), vec!["File added:\na\n", "File added:\nb\n"]);
}
