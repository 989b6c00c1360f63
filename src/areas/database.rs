use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::database::pack::{Pack, PackEntry, apply_delta};
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::{Commit, Tag};
use crate::artifacts::objects::object::{RawObject, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use anyhow::Context;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use std::path::Path;

/// Upper bound on delta chain length, guards against cyclic packs
const MAX_DELTA_CHAIN: usize = 10_000;

/// Upper bound on annotated tags pointing at annotated tags
const MAX_TAG_DEPTH: usize = 64;

/// Read-only view of `.git/objects`
#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
    packs: Vec<Pack>,
}

impl Database {
    /// Open the object database, indexing every pack under `objects/pack`
    pub fn open(path: Box<Path>) -> anyhow::Result<Self> {
        let pack_dir = path.join("pack");
        let mut packs = Vec::new();

        if pack_dir.is_dir() {
            let mut pack_paths = std::fs::read_dir(&pack_dir)
                .with_context(|| format!("Unable to list {}", pack_dir.display()))?
                .map(|entry| entry.map(|entry| entry.path()))
                .collect::<Result<Vec<_>, std::io::Error>>()?;
            pack_paths.retain(|p| p.extension().is_some_and(|ext| ext == "pack"));
            pack_paths.sort();

            for pack_path in pack_paths {
                if !pack_path.with_extension("idx").exists() {
                    tracing::debug!(pack = %pack_path.display(), "skipping pack without index");
                    continue;
                }
                packs.push(Pack::open(&pack_path)?);
            }
        }

        tracing::debug!(
            objects = %path.display(),
            packs = packs.len(),
            "opened object database"
        );

        Ok(Database { path, packs })
    }

    /// Load and inflate an object, loose objects first, then packs
    pub fn load(&self, object_id: &ObjectId) -> anyhow::Result<RawObject> {
        self.load_at_depth(object_id, 0)
    }

    fn load_at_depth(&self, object_id: &ObjectId, depth: usize) -> anyhow::Result<RawObject> {
        if let Some(object) = self.load_loose(object_id)? {
            return Ok(object);
        }

        for pack in &self.packs {
            if let Some(offset) = pack.index().lookup(object_id)? {
                return self.resolve_packed(pack, offset, depth).with_context(|| {
                    format!(
                        "Unable to read object {object_id} from {}",
                        pack.path().display()
                    )
                });
            }
        }

        anyhow::bail!("Object {object_id} not found in {}", self.path.display())
    }

    fn load_loose(&self, object_id: &ObjectId) -> anyhow::Result<Option<RawObject>> {
        let object_path = self.path.join(object_id.to_path());
        let compressed = match std::fs::read(&object_path) {
            Ok(compressed) => compressed,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("Unable to read object file {}", object_path.display())
                });
            }
        };

        let content = Self::decompress(&compressed)?;
        let mut reader = Cursor::new(content);
        let (object_type, size) = ObjectType::parse_object_header(&mut reader)?;

        let start = reader.position() as usize;
        let data = reader.into_inner().slice(start..);
        if data.len() != size {
            anyhow::bail!(
                "Object {object_id} declares {size} bytes but holds {}",
                data.len()
            );
        }

        Ok(Some(RawObject::new(object_type, data)))
    }

    fn resolve_packed(&self, pack: &Pack, offset: u64, depth: usize) -> anyhow::Result<RawObject> {
        // walk down to the first whole object, remembering the deltas on the way
        let mut deltas = Vec::new();
        let mut offset = offset;

        let base = loop {
            if depth + deltas.len() > MAX_DELTA_CHAIN {
                anyhow::bail!("delta chain is too long");
            }

            match pack.read_entry(offset)? {
                PackEntry::Whole(object) => break object,
                PackEntry::OfsDelta { base_offset, delta } => {
                    deltas.push(delta);
                    offset = base_offset;
                }
                PackEntry::RefDelta { base, delta } => {
                    deltas.push(delta);
                    break self.load_at_depth(&base, depth + deltas.len())?;
                }
            }
        };

        let object_type = base.object_type;
        let data = deltas
            .iter()
            .rev()
            .try_fold(base.data, |data, delta| -> anyhow::Result<Bytes> {
                Ok(apply_delta(&data, delta)?.into())
            })?;

        Ok(RawObject::new(object_type, data))
    }

    fn decompress(data: &[u8]) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(data);
        let mut decompressed_content = Vec::new();
        decoder
            .read_to_end(&mut decompressed_content)
            .context("Unable to decompress object content")?;

        Ok(decompressed_content.into())
    }

    pub fn parse_object_as_blob(&self, object_id: &ObjectId) -> anyhow::Result<Option<Blob>> {
        let object = self.load(object_id)?;

        match object.object_type {
            ObjectType::Blob => Ok(Some(Blob::new(object.data))),
            _ => Ok(None),
        }
    }

    pub fn parse_object_as_tree(&self, object_id: &ObjectId) -> anyhow::Result<Option<Tree>> {
        let object = self.load(object_id)?;

        match object.object_type {
            ObjectType::Tree => Ok(Some(Tree::deserialize(Cursor::new(object.data))?)),
            _ => Ok(None),
        }
    }

    /// Follow annotated tags until a commit is reached
    pub fn peel_to_commit(&self, object_id: &ObjectId) -> anyhow::Result<(ObjectId, Commit)> {
        let mut current = object_id.clone();

        for _ in 0..MAX_TAG_DEPTH {
            let object = self.load(&current)?;
            match object.object_type {
                ObjectType::Commit => {
                    let commit = Commit::deserialize(Cursor::new(object.data))?;
                    return Ok((current, commit));
                }
                ObjectType::Tag => {
                    let tag = Tag::deserialize(Cursor::new(object.data))?;
                    current = tag.target().clone();
                }
                other => anyhow::bail!("{object_id} points to a {other}, not a commit"),
            }
        }

        anyhow::bail!("{object_id} is nested too deeply in annotated tags")
    }

    /// Flatten the tree `tree_oid` into `/`-separated paths of its non-tree entries
    pub fn flatten_tree(
        &self,
        tree_oid: &ObjectId,
    ) -> anyhow::Result<BTreeMap<String, DatabaseEntry>> {
        let mut entries = BTreeMap::new();
        self.collect_tree(tree_oid, "", &mut entries)?;

        Ok(entries)
    }

    fn collect_tree(
        &self,
        tree_oid: &ObjectId,
        prefix: &str,
        entries: &mut BTreeMap<String, DatabaseEntry>,
    ) -> anyhow::Result<()> {
        let tree = self
            .parse_object_as_tree(tree_oid)?
            .with_context(|| format!("{tree_oid} is not a tree"))?;

        for (name, entry) in tree.into_entries() {
            let path = if prefix.is_empty() {
                name
            } else {
                format!("{prefix}/{name}")
            };

            if entry.is_tree() {
                self.collect_tree(&entry.oid, &path, entries)?;
            } else {
                entries.insert(path, entry);
            }
        }

        Ok(())
    }
}
