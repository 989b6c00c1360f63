//! Git blob object
//!
//! Blobs store file content in Git. They contain only the raw file data,
//! without any metadata like filename or permissions (those are stored in trees).
//!
//! ## Format
//!
//! On disk: `blob <size>\0<content>`
//! In memory: the raw content bytes

use crate::artifacts::objects::object::{Unpackable, hash_object};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use bytes::Bytes;
use derive_new::new;
use std::io::BufRead;

/// Number of leading bytes inspected when sniffing for binary content, as git does
const BINARY_SNIFF_LENGTH: usize = 8000;

/// Git blob object representing file content
///
/// The same type wraps working tree files so both sides of a change decode
/// the same way.
#[derive(Debug, Clone, new)]
pub struct Blob {
    content: Bytes,
}

impl Blob {
    pub fn content(&self) -> &Bytes {
        &self.content
    }

    pub fn object_id(&self) -> anyhow::Result<ObjectId> {
        hash_object(ObjectType::Blob, &self.content)
    }

    /// Whether git would consider the content binary (a NUL byte early on)
    pub fn is_binary(&self) -> bool {
        let sniffed = self.content.len().min(BINARY_SNIFF_LENGTH);
        self.content[..sniffed].contains(&0)
    }

    /// Decode the content as UTF-8 text
    ///
    /// Binary content and invalid UTF-8 are errors rather than lossy conversions.
    pub fn to_text(&self) -> anyhow::Result<String> {
        if self.is_binary() {
            anyhow::bail!("binary content ({} bytes)", self.content.len());
        }

        String::from_utf8(self.content.to_vec())
            .map_err(|err| anyhow::anyhow!("content is not valid UTF-8: {err}"))
    }
}

impl Unpackable for Blob {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        // the header has already been read
        let content = reader
            .bytes()
            .collect::<Result<Vec<u8>, std::io::Error>>()?;

        Ok(Self::new(content.into()))
    }
}
