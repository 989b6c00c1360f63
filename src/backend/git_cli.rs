//! Backend running the `git` executable
//!
//! `git status` always compares against `HEAD`, so the reference must resolve to the
//! commit `HEAD` points at. Paths in porcelain output are relative to the top level of
//! the working tree, which is also where working tree content is read from.

use crate::areas::workspace::Workspace;
use crate::artifacts::status::short_status;
use crate::artifacts::status::state_vector::ChangeRecord;
use crate::backend::VersionControl;
use anyhow::Context;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::process::Command;

const GIT_PROGRAM: &str = "git";

#[derive(Debug)]
pub struct GitCliBackend {
    directory: PathBuf,
    commit: String,
    workspace: Workspace,
}

async fn run_git(directory: &Path, args: &[&str]) -> anyhow::Result<Vec<u8>> {
    let output = Command::new(GIT_PROGRAM)
        .arg("-C")
        .arg(directory)
        .args(args)
        .kill_on_drop(true)
        .output()
        .await
        .with_context(|| format!("Unable to run {GIT_PROGRAM} {}", args.join(" ")))?;

    if !output.status.success() {
        anyhow::bail!(
            "{GIT_PROGRAM} {} failed ({}): {}",
            args.join(" "),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(output.stdout)
}

async fn rev_parse(directory: &Path, args: &[&str]) -> anyhow::Result<String> {
    let mut full_args = vec!["rev-parse"];
    full_args.extend_from_slice(args);
    let stdout = run_git(directory, &full_args).await?;

    Ok(String::from_utf8(stdout)
        .context("git rev-parse printed invalid UTF-8")?
        .trim()
        .to_string())
}

impl GitCliBackend {
    pub async fn open(directory: &Path, reference: &str) -> anyhow::Result<Self> {
        let commit = rev_parse(directory, &["--verify", &format!("{reference}^{{commit}}")])
            .await
            .with_context(|| format!("Unknown revision {reference:?}"))?;
        let head = rev_parse(directory, &["--verify", "HEAD^{commit}"]).await?;

        if commit != head {
            anyhow::bail!(
                "{reference} ({commit}) is not HEAD ({head}); the git backend can only compare against HEAD"
            );
        }

        let top_level = rev_parse(directory, &["--show-toplevel"]).await?;
        tracing::debug!(%commit, top_level = %top_level, "resolved reference with git");

        Ok(Self {
            directory: directory.to_path_buf(),
            commit,
            workspace: Workspace::new(PathBuf::from(top_level).into_boxed_path()),
        })
    }
}

impl VersionControl for GitCliBackend {
    fn directory(&self) -> &Path {
        &self.directory
    }

    async fn status(&self) -> anyhow::Result<Vec<ChangeRecord>> {
        let output = run_git(
            self.workspace.path(),
            &[
                "status",
                "--porcelain=v1",
                "-z",
                "--untracked-files=all",
                "--no-renames",
                "--ignore-submodules=all",
            ],
        )
        .await?;

        let mut records = short_status::parse_nul_terminated(&output)?;
        records.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(records)
    }

    async fn read_committed(&self, path: &str) -> anyhow::Result<Bytes> {
        let object = format!("{}:{path}", self.commit);
        let content = run_git(self.workspace.path(), &["cat-file", "blob", &object]).await?;

        Ok(content.into())
    }

    async fn read_workdir(&self, path: &str) -> anyhow::Result<Bytes> {
        self.workspace.read_file(path).await
    }
}
