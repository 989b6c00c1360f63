//! Git index (staging area), read-only
//!
//! The index records the content staged for the next commit along with the stat data of
//! every staged file when it was last refreshed. Both are needed for a status: the staged
//! object ids give the stage column, the stat data lets unchanged files skip hashing.
//!
//! ## Data Structures
//!
//! - `entries`: Maps each path to its entries, one per merge stage (a single stage 0
//!   entry unless the path is conflicted)
//! - `modified`: Modification time of the index file, the reference point for racy entries

use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::{CHECKSUM_SIZE, HEADER_SIZE};
use crate::artifacts::objects::object::Unpackable;
use anyhow::Context;
use byteorder::{ByteOrder, NetworkEndian};
use sha1::{Digest, Sha1};
use std::collections::BTreeMap;
use std::io::Read;
use std::ops::DerefMut;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Size of an extension header: 4-byte signature and 4-byte length
const EXTENSION_HEADER_SIZE: usize = 8;

#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the index file (typically `.git/index`)
    path: Box<Path>,
    version: u32,
    entries: BTreeMap<String, Vec<IndexEntry>>,
    modified: Option<SystemTime>,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            version: 0,
            entries: BTreeMap::new(),
            modified: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Format version of the loaded file, 0 when there is no index
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Load the index from disk
    ///
    /// A missing index (fresh repository) is an empty index, it is never created.
    ///
    /// # Locking
    ///
    /// Acquires a shared lock on the index file during reading.
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        self.entries.clear();
        self.version = 0;
        self.modified = None;

        let mut index_file = match std::fs::File::open(self.path()) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Unable to open index {}", self.path.display()));
            }
        };
        let mut lock = file_guard::lock(&mut index_file, file_guard::Lock::Shared, 0, 1)?;

        let modified = lock.deref_mut().metadata()?.modified().ok();
        let mut data = Vec::new();
        lock.deref_mut()
            .read_to_end(&mut data)
            .with_context(|| format!("Unable to read index {}", self.path.display()))?;

        if data.is_empty() {
            return Ok(());
        }

        self.parse(&data)
            .with_context(|| format!("Corrupt index {}", self.path.display()))?;
        self.modified = modified;

        tracing::debug!(
            index = %self.path.display(),
            version = self.version,
            paths = self.entries.len(),
            "loaded index"
        );

        Ok(())
    }

    fn parse(&mut self, data: &[u8]) -> anyhow::Result<()> {
        if data.len() < HEADER_SIZE + CHECKSUM_SIZE {
            anyhow::bail!("Index file is too short");
        }
        Self::verify_checksum(data)?;

        let header = IndexHeader::deserialize(&data[..HEADER_SIZE])?;
        let body_end = data.len() - CHECKSUM_SIZE;

        let mut cursor = HEADER_SIZE;
        let mut previous_name = String::new();
        for _ in 0..header.entries_count {
            let (entry, consumed) =
                IndexEntry::parse(&data[cursor..body_end], header.version, &previous_name)?;
            cursor += consumed;
            previous_name.clone_from(&entry.name);

            self.entries
                .entry(entry.name.clone())
                .or_default()
                .push(entry);
        }

        Self::skip_extensions(&data[cursor..body_end])?;
        self.version = header.version;

        Ok(())
    }

    /// The trailer is the SHA-1 of everything before it, or zeros with `index.skipHash`
    fn verify_checksum(data: &[u8]) -> anyhow::Result<()> {
        let (content, checksum) = data.split_at(data.len() - CHECKSUM_SIZE);
        if checksum.iter().all(|&byte| byte == 0) {
            return Ok(());
        }

        let mut hasher = Sha1::new();
        hasher.update(content);
        if hasher.finalize().as_slice() != checksum {
            anyhow::bail!("Index checksum does not match its content");
        }

        Ok(())
    }

    /// Optional extensions (cached trees, resolve-undo, ...) have an uppercase signature
    /// and are skipped; a lowercase signature changes the meaning of the entries.
    fn skip_extensions(mut extensions: &[u8]) -> anyhow::Result<()> {
        while !extensions.is_empty() {
            if extensions.len() < EXTENSION_HEADER_SIZE {
                anyhow::bail!("Truncated index extension header");
            }

            let signature = &extensions[..4];
            if !signature[0].is_ascii_uppercase() {
                anyhow::bail!(
                    "Unsupported index extension {:?}",
                    String::from_utf8_lossy(signature)
                );
            }

            let size = NetworkEndian::read_u32(&extensions[4..8]) as usize;
            extensions = extensions
                .get(EXTENSION_HEADER_SIZE + size..)
                .context("Truncated index extension")?;
        }

        Ok(())
    }

    /// Every path with its entries, sorted by path
    pub fn entries(&self) -> impl Iterator<Item = (&String, &[IndexEntry])> {
        self.entries
            .iter()
            .map(|(path, entries)| (path, entries.as_slice()))
    }

    /// The stage 0 entry of `path`
    pub fn entry_by_path(&self, path: &str) -> Option<&IndexEntry> {
        self.entries
            .get(path)
            .and_then(|entries| entries.iter().find(|entry| entry.stage() == 0))
    }

    pub fn is_conflicted(&self, path: &str) -> bool {
        self.entries
            .get(path)
            .is_some_and(|entries| entries.iter().any(IndexEntry::is_conflicted))
    }

    /// Whether the entry's stat data cannot be trusted to mean "content unchanged"
    ///
    /// A file modified in the same timestamp granule the index was written in may still
    /// carry the staged stat data, so entries not strictly older than the index are racy.
    pub fn is_racy(&self, entry: &IndexEntry) -> bool {
        let Some(modified) = self.modified else {
            return true;
        };
        let Ok(index_time) = modified.duration_since(UNIX_EPOCH) else {
            return true;
        };

        let entry_time = (entry.metadata.mtime as u64, entry.metadata.mtime_nsec as u32);
        entry_time >= (index_time.as_secs(), index_time.subsec_nanos())
    }
}
