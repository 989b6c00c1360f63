use crate::common::command::{check_with, git_commit_all, repository_dir};
use crate::common::file::{FileSpec, write_file};
use assert_fs::TempDir;
use git_status_check::artifacts::check::render::RenderMode;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn numbered(count: usize) -> String {
    (1..=count).map(|i| format!("line {i}\n")).collect()
}

#[rstest]
#[tokio::test]
async fn each_hunk_becomes_an_annotation(repository_dir: TempDir) {
    let root = repository_dir.path();
    write_file(FileSpec::new(root.join("n.txt"), numbered(30)));
    git_commit_all(root, "Numbers");
    let modified = numbered(30)
        .replace("line 5\n", "line five\n")
        .replace("line 25\n", "line twenty-five\n");
    write_file(FileSpec::new(root.join("n.txt"), modified));

    let (outcome, sink) = check_with(root, |options| options.render_mode = RenderMode::Hunks)
        .await
        .unwrap();

    assert_eq!(outcome.unexpected_changes, 1);
    assert_eq!(outcome.alerts, 2);
    let ranges = sink
        .payloads
        .iter()
        .map(|p| (p.properties.start_line, p.properties.end_line))
        .collect::<Vec<_>>();
    assert_eq!(ranges, vec![(Some(2), Some(8)), (Some(22), Some(28))]);
    assert_eq!(
        sink.messages()[0],
        "```diff\n@@ -2,7 +2,7 @@\n line 2\n line 3\n line 4\n-line 5\n+line five\n line 6\n line 7\n line 8\n```"
    );
    assert!(sink.payloads.iter().all(|p| p.properties.title == "Unexpected change in n.txt"));
}

#[rstest]
#[tokio::test]
async fn context_size_is_configurable(repository_dir: TempDir) {
    let root = repository_dir.path();
    write_file(FileSpec::new(root.join("n.txt"), numbered(10)));
    git_commit_all(root, "Numbers");
    write_file(FileSpec::new(
        root.join("n.txt"),
        numbered(10).replace("line 5\n", "line five\n"),
    ));

    let (_, sink) = check_with(root, |options| {
        options.render_mode = RenderMode::Hunks;
        options.context = 0;
    })
    .await
    .unwrap();

    assert_eq!(
        sink.messages(),
        vec!["```diff\n@@ -5,1 +5,1 @@\n-line 5\n+line five\n```"]
    );
    assert_eq!(sink.payloads[0].properties.start_line, Some(5));
    assert_eq!(sink.payloads[0].properties.end_line, Some(5));
}
