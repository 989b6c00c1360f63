use crate::common::command::{
    check_with, committed_repository, git_commit_all, git_output, run_git_command,
};
use crate::common::file::{FileSpec, write_file};
use assert_fs::TempDir;
use git_status_check::CheckError;
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};

/// `a.txt` changes in a second commit; `v1`, `light` and `release` name the first one
#[fixture]
fn tagged_repository(committed_repository: TempDir) -> TempDir {
    let root = committed_repository.path();
    run_git_command(root, &["tag", "-a", "v1", "-m", "First release"])
        .assert()
        .success();
    run_git_command(root, &["tag", "light"]).assert().success();
    run_git_command(root, &["branch", "release"]).assert().success();
    write_file(FileSpec::new(root.join("a.txt"), "second version\n".to_string()));
    git_commit_all(root, "Second commit");

    committed_repository
}

#[rstest]
#[case("HEAD", 0)]
#[case("HEAD~1", 1)]
#[case("v1", 1)]
#[case("light", 1)]
#[case("release", 1)]
#[case("refs/heads/release", 1)]
#[case("refs/tags/v1", 1)]
#[tokio::test]
async fn references_name_the_commit_to_compare_against(
    tagged_repository: TempDir,
    #[case] reference: &str,
    #[case] expected: usize,
) {
    let reference = match reference {
        // parent syntax is left to git; the check takes the resolved id
        "HEAD~1" => git_output(tagged_repository.path(), &["rev-parse", "HEAD~1"]),
        other => other.to_string(),
    };

    let (outcome, sink) = check_with(tagged_repository.path(), |options| {
        options.reference = reference;
    })
    .await
    .unwrap();

    assert_eq!(outcome.unexpected_changes, expected);
    if expected > 0 {
        assert_eq!(
            sink.messages(),
            vec!["File modified:\n@@ -1,3 +1,1 @@\n-Line 1\n-Line 2\n-Line 3\n+second version\n"]
        );
    }
}

#[rstest]
#[tokio::test]
async fn packed_tags_are_peeled(tagged_repository: TempDir) {
    run_git_command(tagged_repository.path(), &["pack-refs", "--all"])
        .assert()
        .success();

    let (outcome, _) = check_with(tagged_repository.path(), |options| {
        options.reference = "v1".to_string();
    })
    .await
    .unwrap();

    assert_eq!(outcome.unexpected_changes, 1);
}

#[rstest]
#[case("no-such-branch")]
#[case("0000000000000000000000000000000000000000")]
#[case("config")]
#[tokio::test]
async fn unknown_references_abort_the_run(tagged_repository: TempDir, #[case] reference: &str) {
    let result = check_with(tagged_repository.path(), |options| {
        options.reference = reference.to_string();
    })
    .await;

    assert!(matches!(result, Err(CheckError::Enumeration { .. })));
}

#[rstest]
#[tokio::test]
async fn linked_worktrees_are_checked_on_their_own(committed_repository: TempDir) {
    let worktrees = TempDir::new().unwrap();
    let worktree = worktrees.path().join("wt");
    run_git_command(
        committed_repository.path(),
        &["worktree", "add", "--quiet", "--detach", worktree.to_str().unwrap()],
    )
    .assert()
    .success();

    let (clean, _) = check_with(&worktree, |_| {}).await.unwrap();
    write_file(FileSpec::new(worktree.join("a.txt"), "worktree change\n".to_string()));
    let (changed, sink) = check_with(&worktree, |_| {}).await.unwrap();
    let (main, _) = check_with(committed_repository.path(), |_| {}).await.unwrap();

    assert_eq!(clean.unexpected_changes, 0);
    assert_eq!(changed.unexpected_changes, 1);
    assert_eq!(sink.files(), vec!["a.txt"]);
    assert_eq!(main.unexpected_changes, 0);
}

#[rstest]
#[tokio::test]
async fn a_subdirectory_checks_the_whole_repository(committed_repository: TempDir) {
    write_file(FileSpec::new(
        committed_repository.path().join("a.txt"),
        "changed\n".to_string(),
    ));

    let (outcome, sink) = check_with(&committed_repository.path().join("dir"), |_| {})
        .await
        .unwrap();

    assert_eq!(outcome.unexpected_changes, 1);
    assert_eq!(sink.files(), vec!["a.txt"]);
}
