use crate::common::command::{SCENARIO_CONTENT, check, committed_repository, run_git_command};
use crate::common::file::delete_path;
use assert_fs::TempDir;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
#[tokio::test]
async fn report_a_deleted_file_with_its_original_content(committed_repository: TempDir) {
    delete_path(&committed_repository.path().join("a.txt"));

    let (outcome, sink) = check(committed_repository.path()).await;

    assert_eq!(outcome.unexpected_changes, 1);
    assert_eq!(sink.files(), vec!["a.txt"]);
    assert_eq!(sink.messages(), vec![format!("File deleted:\n{SCENARIO_CONTENT}")]);
    assert_eq!(sink.payloads[0].properties.title, "Unexpected file deleted");
}

#[rstest]
#[case(&["rm", "--quiet", "a.txt"])]
#[case(&["rm", "--quiet", "--cached", "a.txt"])]
#[tokio::test]
async fn report_files_removed_from_the_index(
    committed_repository: TempDir,
    #[case] git_args: &[&str],
) {
    run_git_command(committed_repository.path(), git_args)
        .assert()
        .success();

    let (outcome, sink) = check(committed_repository.path()).await;

    assert_eq!(outcome.unexpected_changes, 1);
    assert_eq!(sink.groups, vec!["a.txt --- file deleted"]);
}
