//! Backend reading the repository files directly

use crate::areas::repository::Repository;
use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::status::state_vector::ChangeRecord;
use crate::backend::VersionControl;
use anyhow::Context;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct NativeBackend {
    directory: PathBuf,
    repository: Repository,
    commit_oid: ObjectId,
    head: BTreeMap<String, DatabaseEntry>,
}

impl NativeBackend {
    /// Discover the repository containing `directory` and snapshot `reference`
    pub fn open(directory: &Path, reference: &str) -> anyhow::Result<Self> {
        let repository = Repository::discover(directory)?;
        let (commit_oid, commit) = repository.resolve_commit(reference)?;
        let head = repository.head_tree(&commit)?;

        tracing::debug!(
            repository = %repository.path().display(),
            commit = %commit_oid,
            files = head.len(),
            "resolved reference"
        );

        Ok(Self {
            directory: directory.to_path_buf(),
            repository,
            commit_oid,
            head,
        })
    }
}

impl VersionControl for NativeBackend {
    fn directory(&self) -> &Path {
        &self.directory
    }

    async fn status(&self) -> anyhow::Result<Vec<ChangeRecord>> {
        self.repository.status_matrix(&self.head).compute()
    }

    async fn read_committed(&self, path: &str) -> anyhow::Result<Bytes> {
        let entry = self
            .head
            .get(path)
            .with_context(|| format!("{path} is not part of commit {}", self.commit_oid))?;
        if entry.mode == EntryMode::Gitlink {
            anyhow::bail!("{path} is a submodule");
        }

        let blob = self
            .repository
            .database()
            .parse_object_as_blob(&entry.oid)?
            .with_context(|| format!("{} is not a blob", entry.oid))?;

        Ok(blob.content().clone())
    }

    async fn read_workdir(&self, path: &str) -> anyhow::Result<Bytes> {
        self.repository.workspace().read_file(path).await
    }
}
