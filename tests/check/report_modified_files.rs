use crate::common::command::{
    SCENARIO_MODIFIED, check, committed_repository, run_git_command,
};
use crate::common::file::{FileSpec, write_file};
use assert_fs::TempDir;
use git_status_check::artifacts::diff::patch::Patch;
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::os::unix::fs::PermissionsExt;

#[rstest]
#[tokio::test]
async fn report_a_modified_file_as_a_patch(committed_repository: TempDir) {
    write_file(FileSpec::new(
        committed_repository.path().join("a.txt"),
        SCENARIO_MODIFIED.to_string(),
    ));

    let (outcome, sink) = check(committed_repository.path()).await;

    assert_eq!(outcome.unexpected_changes, 1);
    assert_eq!(
        sink.messages(),
        vec!["File modified:\n@@ -1,3 +1,3 @@\n Line 1\n-Line 2\n Line 3\n+Line 4\n"]
    );
    assert_eq!(sink.payloads[0].properties.title, "Unexpected file modified");
    assert_eq!(sink.payloads[0].properties.start_line, None);
}

#[rstest]
#[tokio::test]
async fn report_staged_and_unstaged_modifications_once(committed_repository: TempDir) {
    let path = committed_repository.path().join("a.txt");
    write_file(FileSpec::new(path.clone(), "staged\n".to_string()));
    run_git_command(committed_repository.path(), &["add", "a.txt"])
        .assert()
        .success();
    write_file(FileSpec::new(path, "staged\nand more\n".to_string()));

    let (outcome, sink) = check(committed_repository.path()).await;

    assert_eq!(outcome.unexpected_changes, 1);
    assert_eq!(sink.files(), vec!["a.txt"]);
    assert!(sink.messages()[0].contains("+and more\n"));
}

#[rstest]
#[tokio::test]
async fn report_a_modified_file_in_a_subdirectory(committed_repository: TempDir) {
    write_file(FileSpec::new(
        committed_repository.path().join("dir").join("one.txt"),
        "uno dos\n".to_string(),
    ));

    let (outcome, sink) = check(committed_repository.path()).await;

    assert_eq!(outcome.unexpected_changes, 1);
    assert_eq!(sink.files(), vec!["dir/one.txt"]);
    assert_eq!(sink.messages(), vec!["File modified:\n@@ -1,1 +1,1 @@\n-one\n+uno dos\n"]);
}

#[rstest]
#[tokio::test]
async fn a_missing_final_newline_is_a_change(committed_repository: TempDir) {
    write_file(FileSpec::new(
        committed_repository.path().join("dir").join("one.txt"),
        "one".to_string(),
    ));

    let (_, sink) = check(committed_repository.path()).await;

    assert_eq!(
        sink.messages(),
        vec!["File modified:\n@@ -1,1 +1,1 @@\n-one\n+one\n\\ No newline at end of file\n"]
    );
}

#[rstest]
#[tokio::test]
async fn an_executable_bit_change_is_reported(committed_repository: TempDir) {
    let path = committed_repository.path().join("a.txt");
    let mut permissions = std::fs::metadata(&path).unwrap().permissions();
    permissions.set_mode(0o755);
    std::fs::set_permissions(&path, permissions).unwrap();

    let (outcome, sink) = check(committed_repository.path()).await;

    assert_eq!(outcome.unexpected_changes, 1);
    assert_eq!(sink.messages(), vec!["File modified:\n(no line changes)"]);
}

#[rstest]
#[tokio::test]
async fn emitted_hunks_rebuild_the_new_content(committed_repository: TempDir) {
    let old = std::fs::read_to_string(committed_repository.path().join("a.txt")).unwrap();
    let new = format!("Line 0\n{old}Line 4\nLine 5\n").replace("Line 2\n", "Line two\n");
    write_file(FileSpec::new(committed_repository.path().join("a.txt"), new.clone()));

    let (_, sink) = check(committed_repository.path()).await;
    let patch = Patch::compute(&old, &new, 3);

    assert_eq!(
        sink.messages(),
        vec![format!("File modified:\n{patch}")]
    );
    assert_eq!(patch.apply(&old).unwrap(), new);
}
