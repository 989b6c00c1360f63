use crate::common::command::{SCENARIO_MODIFIED, check_with, committed_repository};
use crate::common::file::{FileSpec, delete_path, write_file};
use assert_fs::TempDir;
use git_status_check::CheckError;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn patterns(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[rstest]
#[tokio::test]
async fn allowed_modifications_and_additions_are_skipped(committed_repository: TempDir) {
    let root = committed_repository.path();
    write_file(FileSpec::new(root.join("a.txt"), SCENARIO_MODIFIED.to_string()));
    write_file(FileSpec::new(root.join("a.new"), "new\n".to_string()));

    let (outcome, sink) = check_with(root, |options| {
        options.allowed_changes = patterns(&["a.txt", "*.new"]);
    })
    .await
    .unwrap();

    assert_eq!(outcome.unexpected_changes, 0);
    assert!(sink.payloads.is_empty());
}

#[rstest]
#[case(&["dir/**"], 1)]
#[case(&["dir/*"], 2)]
#[case(&["**/two.txt"], 2)]
#[case(&["*.txt"], 2)]
#[case(&[], 3)]
#[tokio::test]
async fn globs_match_whole_paths(
    committed_repository: TempDir,
    #[case] allowed: &[&str],
    #[case] expected: usize,
) {
    let root = committed_repository.path();
    delete_path(&root.join("dir"));
    write_file(FileSpec::new(root.join("a.txt"), "changed\n".to_string()));

    let (outcome, _) = check_with(root, |options| {
        options.allowed_changes = patterns(allowed);
    })
    .await
    .unwrap();

    assert_eq!(outcome.unexpected_changes, expected);
}

#[rstest]
#[tokio::test]
async fn an_invalid_pattern_aborts_the_run(committed_repository: TempDir) {
    let result = check_with(committed_repository.path(), |options| {
        options.allowed_changes = patterns(&["src/[unclosed"]);
    })
    .await;

    assert!(matches!(result, Err(CheckError::PatternCompile { .. })));
}
