//! Git commit and annotated tag objects
//!
//! Only the headers needed to reach a snapshot are read: the tree of a commit,
//! its parents, and the target of an annotated tag.
//!
//! ## Format
//!
//! ```text
//! tree <tree-sha>
//! parent <parent-sha>
//! author <name> <email> <timestamp> <timezone>
//! committer <name> <email> <timestamp> <timezone>
//!
//! <commit message>
//! ```

use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use std::io::BufRead;

/// Git commit object
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    tree_oid: ObjectId,
    parents: Vec<ObjectId>,
}

impl Commit {
    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree_oid
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }
}

impl Unpackable for Commit {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let mut tree_oid = None;
        let mut parents = Vec::new();

        for line in reader.lines() {
            let line = line.context("commit headers are not valid UTF-8")?;
            if line.is_empty() {
                // headers end at the first blank line
                break;
            }

            if let Some(oid) = line.strip_prefix("tree ") {
                tree_oid = Some(ObjectId::try_parse(oid.to_string())?);
            } else if let Some(oid) = line.strip_prefix("parent ") {
                parents.push(ObjectId::try_parse(oid.to_string())?);
            }
        }

        Ok(Commit {
            tree_oid: tree_oid.context("commit has no tree header")?,
            parents,
        })
    }
}

/// Annotated tag object, only its target is kept
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Tag {
    target: ObjectId,
    target_type: ObjectType,
}

impl Tag {
    pub fn target(&self) -> &ObjectId {
        &self.target
    }

    pub fn target_type(&self) -> ObjectType {
        self.target_type
    }
}

impl Unpackable for Tag {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let mut target = None;
        let mut target_type = None;

        for line in reader.lines() {
            let line = line?;
            if line.is_empty() {
                break;
            }

            if let Some(oid) = line.strip_prefix("object ") {
                target = Some(ObjectId::try_parse(oid.to_string())?);
            } else if let Some(kind) = line.strip_prefix("type ") {
                target_type = Some(ObjectType::try_from(kind)?);
            }
        }

        Ok(Tag {
            target: target.context("tag has no object header")?,
            target_type: target_type.context("tag has no type header")?,
        })
    }
}
