//! Version-control collaborators of the reporter
//!
//! The reporter only needs three things from a repository: the status of every path
//! relative to the reference commit, the committed content of a path and its current
//! content in the working tree.
//!
//! - `native`: reads the `.git` directory directly
//! - `git_cli`: shells out to the `git` executable

pub mod git_cli;
pub mod native;

use crate::artifacts::status::state_vector::ChangeRecord;
use bytes::Bytes;
use git_cli::GitCliBackend;
use native::NativeBackend;
use std::path::Path;

#[allow(async_fn_in_trait)]
pub trait VersionControl {
    /// Directory the check runs on, used in error messages
    fn directory(&self) -> &Path;

    /// One record per path that may differ from the reference commit, in path order
    async fn status(&self) -> anyhow::Result<Vec<ChangeRecord>>;

    /// Content of `path` in the reference commit
    async fn read_committed(&self, path: &str) -> anyhow::Result<Bytes>;

    /// Current content of `path` in the working tree
    async fn read_workdir(&self, path: &str) -> anyhow::Result<Bytes>;
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum BackendKind {
    /// Read the repository files directly
    #[default]
    Native,
    /// Run the `git` executable
    Git,
}

/// A backend chosen at run time
pub enum Backend {
    Native(NativeBackend),
    Git(GitCliBackend),
}

impl Backend {
    pub async fn open(kind: BackendKind, directory: &Path, reference: &str) -> anyhow::Result<Self> {
        tracing::debug!(?kind, directory = %directory.display(), reference, "opening backend");

        Ok(match kind {
            BackendKind::Native => Backend::Native(NativeBackend::open(directory, reference)?),
            BackendKind::Git => Backend::Git(GitCliBackend::open(directory, reference).await?),
        })
    }
}

impl VersionControl for Backend {
    fn directory(&self) -> &Path {
        match self {
            Backend::Native(backend) => backend.directory(),
            Backend::Git(backend) => backend.directory(),
        }
    }

    async fn status(&self) -> anyhow::Result<Vec<ChangeRecord>> {
        match self {
            Backend::Native(backend) => backend.status().await,
            Backend::Git(backend) => backend.status().await,
        }
    }

    async fn read_committed(&self, path: &str) -> anyhow::Result<Bytes> {
        match self {
            Backend::Native(backend) => backend.read_committed(path).await,
            Backend::Git(backend) => backend.read_committed(path).await,
        }
    }

    async fn read_workdir(&self, path: &str) -> anyhow::Result<Bytes> {
        match self {
            Backend::Native(backend) => backend.read_workdir(path).await,
            Backend::Git(backend) => backend.read_workdir(path).await,
        }
    }
}
