//! Three-way status of every path against a reference commit
//!
//! The union of the reference tree, the index and the unignored working tree files is
//! walked in path order. For each path the reference commit gives the head column, the
//! stage 0 index entry compared against the reference blob gives the stage column and
//! the working tree file compared against the reference blob gives the workdir column.
//!
//! ## Stat cache
//!
//! Hashing every file would read the whole working tree. When the index entry's stat data
//! still matches the file (size, mode and modification time) and the entry is older than
//! the index itself, the staged object id is taken as the file's content hash.

use crate::areas::repository::Repository;
use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::index::index_entry::{EntryMetadata, IndexEntry};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::status::state_vector::{
    ChangeRecord, ChangeState, HeadState, StageState, StateVector, WorkdirState,
};
use anyhow::Context;
use derive_new::new;
use std::collections::{BTreeMap, BTreeSet};

#[derive(new)]
pub struct StatusMatrix<'r> {
    repository: &'r Repository,
    /// Flattened reference tree, see `Database::flatten_tree`
    head: &'r BTreeMap<String, DatabaseEntry>,
}

impl StatusMatrix<'_> {
    /// One record per path, sorted by path, unmodified paths included
    pub fn compute(&self) -> anyhow::Result<Vec<ChangeRecord>> {
        let index = self.repository.index();
        let workspace = self.repository.workspace();

        let head = self.head;
        let workspace_files = workspace.list_files()?;

        let paths = head
            .keys()
            .chain(index.entries().map(|(path, _)| path))
            .chain(workspace_files.iter())
            .collect::<BTreeSet<_>>();

        let mut records = Vec::with_capacity(paths.len());
        for path in paths {
            let head_entry = head.get(path);
            let index_entry = index.entry_by_path(path);

            // submodules are reported by their own repository, sparse index
            // directory entries stand for whole subtrees
            if head_entry.is_some_and(|entry| !entry.mode.is_blob())
                || index_entry.is_some_and(|entry| !entry.metadata.mode.is_blob())
            {
                continue;
            }

            let stage = match index_entry {
                _ if index.is_conflicted(path) => StageState::Conflicted,
                None => StageState::Absent,
                Some(entry) if Self::same_content(head_entry, &entry.oid, entry.metadata.mode) => {
                    StageState::Unchanged
                }
                Some(_) => StageState::Changed,
            };

            let workdir = match index_entry {
                Some(entry) if entry.is_skip_worktree() => match stage {
                    StageState::Unchanged => WorkdirState::Unchanged,
                    _ => WorkdirState::Changed,
                },
                _ => self.workdir_state(path, head_entry, index_entry)?,
            };

            let head_state = match head_entry {
                Some(_) => HeadState::Present,
                None => HeadState::Absent,
            };

            records.push(ChangeRecord::new(
                path.clone(),
                ChangeState::Matrix(StateVector::new(head_state, workdir, stage)),
            ));
        }

        tracing::debug!(paths = records.len(), "computed status matrix");

        Ok(records)
    }

    fn same_content(head_entry: Option<&DatabaseEntry>, oid: &ObjectId, mode: EntryMode) -> bool {
        head_entry.is_some_and(|head| &head.oid == oid && head.mode == mode)
    }

    fn workdir_state(
        &self,
        path: &str,
        head_entry: Option<&DatabaseEntry>,
        index_entry: Option<&IndexEntry>,
    ) -> anyhow::Result<WorkdirState> {
        let workspace = self.repository.workspace();

        let stat = match workspace.stat_file(path)? {
            Some(stat) if !stat.mode.is_tree() => stat,
            // a directory now stands where the file was, its files are listed on their own
            _ => return Ok(WorkdirState::Absent),
        };

        let Some(head_entry) = head_entry else {
            return Ok(WorkdirState::Changed);
        };
        if head_entry.mode != stat.mode {
            return Ok(WorkdirState::Changed);
        }

        let oid = match index_entry {
            Some(entry) if self.is_stat_clean(entry, &stat) => entry.oid.clone(),
            _ => workspace
                .parse_blob(path)?
                .object_id()
                .with_context(|| format!("Unable to hash {path}"))?,
        };

        Ok(match oid == head_entry.oid {
            true => WorkdirState::Unchanged,
            false => WorkdirState::Changed,
        })
    }

    fn is_stat_clean(&self, entry: &IndexEntry, stat: &EntryMetadata) -> bool {
        !entry.is_intent_to_add()
            && entry.stat_match(stat)
            && entry.times_match(stat)
            && !self.repository.index().is_racy(entry)
    }
}
