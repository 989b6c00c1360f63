use crate::common::command::{check, committed_repository, run_git_command};
use crate::common::file::{FileSpec, age_file, file_mtime, set_file_mtime, write_file};
use assert_fs::TempDir;
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::time::Duration;

#[rstest]
#[tokio::test]
async fn touched_files_are_not_changes(committed_repository: TempDir) {
    let path = committed_repository.path().join("a.txt");
    age_file(&path, Duration::from_secs(3600));

    let (outcome, _) = check(committed_repository.path()).await;

    assert_eq!(outcome.unexpected_changes, 0);
}

#[rstest]
#[tokio::test]
async fn same_size_edits_with_a_restored_mtime_are_found(committed_repository: TempDir) {
    // an index no newer than the entry cannot vouch for it
    let path = committed_repository.path().join("dir").join("one.txt");
    let mtime = file_mtime(&path);
    write_file(FileSpec::new(path.clone(), "eno\n".to_string()));
    set_file_mtime(&path, mtime);
    set_file_mtime(&committed_repository.path().join(".git").join("index"), mtime);

    let (outcome, sink) = check(committed_repository.path()).await;

    assert_eq!(outcome.unexpected_changes, 1);
    assert_eq!(sink.files(), vec!["dir/one.txt"]);
}

#[rstest]
#[tokio::test]
async fn refreshed_stat_data_is_trusted_for_unchanged_files(committed_repository: TempDir) {
    let root = committed_repository.path();
    for name in ["a.txt", "dir/one.txt", "dir/sub/two.txt"] {
        age_file(&root.join(name), Duration::from_secs(7200));
    }
    run_git_command(root, &["update-index", "--refresh"])
        .assert()
        .success();
    write_file(FileSpec::new(root.join("a.txt"), "edited after refresh\n".to_string()));

    let (outcome, sink) = check(root).await;

    assert_eq!(outcome.unexpected_changes, 1);
    assert_eq!(sink.files(), vec!["a.txt"]);
}
