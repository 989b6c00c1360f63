use crate::artifacts::index::index_entry::EntryMetadata;
use crate::artifacts::objects::blob::Blob;
use anyhow::Context;
use bytes::Bytes;
use ignore::WalkBuilder;
use std::collections::BTreeSet;
use std::fs::FileType;
use std::os::unix::ffi::OsStrExt;
use std::path::{Component, Path, PathBuf};

/// Name of the git directory, never part of the working tree
const GIT_DIR_NAME: &str = ".git";

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every file of the working tree not excluded by the repository's ignore rules
    ///
    /// `.gitignore` files, `.git/info/exclude` and the global excludes file are honoured,
    /// `.git` and nested repositories are never entered. Paths are relative to the
    /// workspace root and `/`-separated. Tracked files matching an ignore rule are not
    /// listed here; callers add them from the index.
    pub fn list_files(&self) -> anyhow::Result<BTreeSet<String>> {
        let root = self.path.to_path_buf();
        let walker = WalkBuilder::new(&root)
            .hidden(false)
            .parents(false)
            .ignore(false)
            .git_ignore(true)
            .git_exclude(true)
            .git_global(true)
            .require_git(false)
            .follow_links(false)
            .filter_entry(move |entry| {
                if entry.file_name() == GIT_DIR_NAME {
                    return false;
                }
                let is_dir = entry.file_type().is_some_and(|file_type| file_type.is_dir());
                // a directory with its own .git is another repository (or a submodule)
                !(is_dir && entry.depth() > 0 && entry.path().join(GIT_DIR_NAME).exists())
            })
            .build();

        let mut files = BTreeSet::new();
        for entry in walker {
            let entry = entry.with_context(|| format!("Unable to walk {}", root.display()))?;
            // git only tracks regular files and symlinks, fifos and sockets are invisible
            let is_trackable = entry
                .file_type()
                .is_some_and(|file_type| file_type.is_file() || file_type.is_symlink());
            if !is_trackable {
                continue;
            }

            match Self::relative_name(&root, entry.path()) {
                Some(name) => {
                    files.insert(name);
                }
                None => tracing::warn!(
                    path = %entry.path().display(),
                    "skipping a path that is not valid UTF-8"
                ),
            }
        }

        Ok(files)
    }

    fn relative_name(root: &Path, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(root).ok()?;
        let parts = relative
            .components()
            .map(|component| match component {
                Component::Normal(part) => part.to_str(),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()?;

        Some(parts.join("/"))
    }

    fn is_special(file_type: &FileType) -> bool {
        !(file_type.is_file() || file_type.is_symlink() || file_type.is_dir())
    }

    fn full_path(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    /// Stat data of a working tree path, `None` when nothing git could track exists there
    ///
    /// Symlinks are not followed: git tracks the link itself. Special files (fifos,
    /// sockets, devices) count as absent and are never opened.
    pub fn stat_file(&self, name: &str) -> anyhow::Result<Option<EntryMetadata>> {
        match std::fs::symlink_metadata(self.full_path(name)) {
            Ok(metadata) if Self::is_special(&metadata.file_type()) => Ok(None),
            Ok(metadata) => Ok(Some(EntryMetadata::try_from(&metadata)?)),
            Err(err)
                if matches!(
                    err.kind(),
                    std::io::ErrorKind::NotFound | std::io::ErrorKind::NotADirectory
                ) =>
            {
                Ok(None)
            }
            Err(err) => Err(err).with_context(|| format!("Unable to stat {name}")),
        }
    }

    /// Content git would store for the path: file bytes, or the target of a symlink
    pub fn parse_blob(&self, name: &str) -> anyhow::Result<Blob> {
        let full_path = self.full_path(name);
        let metadata = std::fs::symlink_metadata(&full_path)
            .with_context(|| format!("Unable to stat {name}"))?;
        if Self::is_special(&metadata.file_type()) {
            anyhow::bail!("{name} is not a regular file");
        }

        let content = if metadata.file_type().is_symlink() {
            let target = std::fs::read_link(&full_path)
                .with_context(|| format!("Unable to read link {name}"))?;
            Bytes::copy_from_slice(target.as_os_str().as_bytes())
        } else {
            std::fs::read(&full_path)
                .with_context(|| format!("Unable to read {name}"))?
                .into()
        };

        Ok(Blob::new(content))
    }

    pub async fn read_file(&self, name: &str) -> anyhow::Result<Bytes> {
        let full_path = self.full_path(name);
        let metadata = tokio::fs::symlink_metadata(&full_path)
            .await
            .with_context(|| format!("Unable to stat {name}"))?;
        if Self::is_special(&metadata.file_type()) {
            anyhow::bail!("{name} is not a regular file");
        }

        if metadata.file_type().is_symlink() {
            let target = tokio::fs::read_link(&full_path)
                .await
                .with_context(|| format!("Unable to read link {name}"))?;
            return Ok(Bytes::copy_from_slice(target.as_os_str().as_bytes()));
        }

        Ok(tokio::fs::read(&full_path)
            .await
            .with_context(|| format!("Unable to read {name}"))?
            .into())
    }
}
