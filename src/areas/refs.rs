//! Git references (branches, HEAD, tags)
//!
//! References are human-readable names pointing to objects. They can be:
//! - Direct: Containing an object SHA-1
//! - Symbolic: Pointing to another reference (e.g., HEAD -> refs/heads/master)
//!
//! ## Storage
//!
//! Loose references are text files under the git directory containing either a
//! 40-character SHA-1 or `ref: <name>`. References packed by `git gc` live in
//! `packed-refs`, one `<sha1> <name>` per line, optionally followed by a `^<sha1>`
//! line holding the peeled target of an annotated tag.

use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use derive_new::new;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;

/// Name of the HEAD reference
pub const HEAD_REF_NAME: &str = "HEAD";

/// Upper bound on chained symbolic references
const MAX_SYMREF_DEPTH: usize = 5;

/// Regex pattern for parsing symbolic references
const SYMREF_REGEX: &str = r"^ref: (\S+)$";

/// Regex pattern for a `packed-refs` entry
const PACKED_REF_REGEX: &str = r"^(?P<oid>[0-9a-fA-F]{40}) (?P<name>\S+)$";

#[derive(Debug, Clone)]
enum SymRefOrOid {
    SymRef(String),
    Oid(ObjectId),
}

impl SymRefOrOid {
    fn parse(content: &str) -> anyhow::Result<Option<Self>> {
        let content = content.trim();

        if content.is_empty() {
            return Ok(None);
        }

        if let Some(symref_match) = Regex::new(SYMREF_REGEX)?.captures(content) {
            Ok(Some(SymRefOrOid::SymRef(symref_match[1].to_string())))
        } else {
            Ok(Some(SymRefOrOid::Oid(ObjectId::try_parse(
                content.to_string(),
            )?)))
        }
    }
}

/// Read-only references of a git directory
///
/// A linked worktree keeps its own `HEAD` but shares `refs/` and `packed-refs`
/// with the main repository, found through `commondir`.
#[derive(Debug, new)]
pub struct Refs {
    /// Path to the git directory (typically `.git`)
    path: Box<Path>,
    /// Path holding the shared references, the git directory itself outside worktrees
    common_path: Box<Path>,
}

impl Refs {
    /// Resolve a revision to an object id
    ///
    /// Accepts a full object id, `HEAD`, a full reference name (`refs/...`) or a
    /// short branch, tag or remote name, tried in the order `git rev-parse` uses.
    /// Returns `None` when nothing matches, including an unborn `HEAD`.
    pub fn resolve(&self, revision: &str) -> anyhow::Result<Option<ObjectId>> {
        let revision = revision.trim();

        if revision.len() == OBJECT_ID_LENGTH
            && let Ok(oid) = ObjectId::try_parse(revision.to_string())
        {
            return Ok(Some(oid));
        }

        if revision.is_empty()
            || revision
                .split('/')
                .any(|part| part.is_empty() || part == "." || part == "..")
        {
            anyhow::bail!("Invalid revision {revision:?}");
        }

        // only pseudo refs such as HEAD or FETCH_HEAD live at the top of the git directory
        let is_pseudo_ref = revision
            .chars()
            .all(|c| c.is_ascii_uppercase() || c == '_');
        let candidates = [
            revision.to_string(),
            format!("refs/{revision}"),
            format!("refs/tags/{revision}"),
            format!("refs/heads/{revision}"),
            format!("refs/remotes/{revision}"),
            format!("refs/remotes/{revision}/{HEAD_REF_NAME}"),
        ];
        let skip = if is_pseudo_ref || revision.starts_with("refs/") {
            0
        } else {
            1
        };

        let packed_refs = self.packed_refs()?;
        for candidate in candidates.iter().skip(skip) {
            if let Some(oid) = self.read_ref(candidate, &packed_refs)? {
                tracing::debug!(revision, reference = %candidate, %oid, "resolved revision");
                return Ok(Some(oid));
            }
        }

        Ok(None)
    }

    /// Follow a reference through symbolic references, loose files first
    fn read_ref(
        &self,
        name: &str,
        packed_refs: &BTreeMap<String, ObjectId>,
    ) -> anyhow::Result<Option<ObjectId>> {
        let mut name = name.to_string();

        for _ in 0..MAX_SYMREF_DEPTH {
            let base = if name.starts_with("refs/") {
                &self.common_path
            } else {
                &self.path
            };
            let ref_path = base.join(&name);
            let content = if ref_path.is_file() {
                let content = std::fs::read_to_string(&ref_path)
                    .with_context(|| format!("failed to read ref file at {ref_path:?}"))?;
                SymRefOrOid::parse(&content)
                    .with_context(|| format!("invalid ref file at {ref_path:?}"))?
            } else {
                packed_refs.get(&name).cloned().map(SymRefOrOid::Oid)
            };

            match content {
                Some(SymRefOrOid::SymRef(target)) => name = target,
                Some(SymRefOrOid::Oid(oid)) => return Ok(Some(oid)),
                None => return Ok(None),
            }
        }

        anyhow::bail!("symbolic reference {name} is nested too deeply")
    }

    fn packed_refs(&self) -> anyhow::Result<BTreeMap<String, ObjectId>> {
        let packed_refs_path = self.common_path.join("packed-refs");
        let content = match std::fs::read_to_string(&packed_refs_path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(BTreeMap::new());
            }
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("failed to read packed refs at {packed_refs_path:?}")
                });
            }
        };

        Self::parse_packed_refs(&content)
    }

    /// Comments (`# pack-refs with: ...`) and peeled lines (`^<sha1>`) are skipped,
    /// peeling is done on the objects themselves.
    fn parse_packed_refs(content: &str) -> anyhow::Result<BTreeMap<String, ObjectId>> {
        let packed_ref_regex = Regex::new(PACKED_REF_REGEX)?;

        content
            .lines()
            .filter_map(|line| packed_ref_regex.captures(line.trim_end()))
            .map(|captures| {
                let oid = ObjectId::try_parse(captures["oid"].to_string())?;
                Ok((captures["name"].to_string(), oid))
            })
            .collect()
    }
}
