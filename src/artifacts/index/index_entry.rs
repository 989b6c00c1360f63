//! Index entry representation
//!
//! Each entry in the index represents a staged path with:
//! - Path relative to the repository root
//! - Content hash (object ID)
//! - Stat data (mode, size, timestamps) captured when the path was staged
//! - Flags carrying the merge stage and, from version 3 on, extended flags
//!
//! ## Entry Format
//!
//! ```text
//! ctime | ctime_nsec | mtime | mtime_nsec | dev | ino | mode | uid | gid | size  (10 x u32)
//! sha1 (20 bytes) | flags (u16) | [extended flags (u16), v3+]
//! name
//! ```
//!
//! Versions 2 and 3 store the full name, NUL-terminated and padded to 8 bytes.
//! Version 4 stores the name prefix-compressed against the previous entry, without padding.

use crate::artifacts::index::entry_mode::{EntryMode, FileMode};
use crate::artifacts::objects::RAW_OBJECT_ID_LENGTH;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use bitflags::bitflags;
use byteorder::{ByteOrder, NetworkEndian};
use std::fs::Metadata;
use std::os::unix::prelude::MetadataExt;

/// Block size for entry alignment (8 bytes)
pub const ENTRY_BLOCK: usize = 8;

/// Size of the stat data, object id and flags of every entry
pub const ENTRY_FIXED_SIZE: usize = 40 + RAW_OBJECT_ID_LENGTH + 2;

bitflags! {
    /// The 16-bit flags word following the object id
    #[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
    pub struct IndexEntryFlags: u16 {
        const ASSUME_VALID = 0x8000;
        const EXTENDED = 0x4000;
        const STAGE = 0x3000;
        const NAME_LENGTH = 0x0fff;
    }
}

bitflags! {
    /// Extended flags, present when [`IndexEntryFlags::EXTENDED`] is set
    #[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
    pub struct ExtendedFlags: u16 {
        const SKIP_WORKTREE = 0x4000;
        const INTENT_TO_ADD = 0x2000;
    }
}

/// Stat data stored in index entries
///
/// Comparing it against the working tree lets unchanged files be recognised
/// without hashing their content.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct EntryMetadata {
    pub ctime: i64,
    pub ctime_nsec: i64,
    pub mtime: i64,
    pub mtime_nsec: i64,
    pub dev: u64,
    pub ino: u64,
    pub mode: EntryMode,
    pub uid: u32,
    pub gid: u32,
    pub size: u64,
}

/// Staged path as read from the index
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct IndexEntry {
    /// Path relative to the repository root, `/`-separated
    pub name: String,
    pub oid: ObjectId,
    pub metadata: EntryMetadata,
    pub flags: IndexEntryFlags,
    pub extended_flags: ExtendedFlags,
}

impl IndexEntry {
    /// Merge stage: 0 for a normal entry, 1-3 while a conflict is unresolved
    pub fn stage(&self) -> u8 {
        ((self.flags & IndexEntryFlags::STAGE).bits() >> 12) as u8
    }

    pub fn is_conflicted(&self) -> bool {
        self.stage() != 0
    }

    /// Entry added with `git add -N`: tracked, but its content was never staged
    pub fn is_intent_to_add(&self) -> bool {
        self.extended_flags.contains(ExtendedFlags::INTENT_TO_ADD)
    }

    pub fn is_skip_worktree(&self) -> bool {
        self.extended_flags.contains(ExtendedFlags::SKIP_WORKTREE)
    }

    /// Size and mode agree with the working tree file
    pub fn stat_match(&self, other: &EntryMetadata) -> bool {
        self.metadata.size == other.size && self.metadata.mode == other.mode
    }

    /// Modification time agrees with the working tree file
    ///
    /// The index stores 32-bit seconds, so only the low bits are compared.
    pub fn times_match(&self, other: &EntryMetadata) -> bool {
        self.metadata.mtime as u32 == other.mtime as u32
            && self.metadata.mtime_nsec as u32 == other.mtime_nsec as u32
    }

    /// Parse the entry at the start of `bytes`
    ///
    /// `previous_name` is the name of the entry before this one, used by the
    /// prefix compression of version 4. Returns the entry and the number of bytes consumed.
    pub fn parse(bytes: &[u8], version: u32, previous_name: &str) -> anyhow::Result<(Self, usize)> {
        if bytes.len() < ENTRY_FIXED_SIZE {
            anyhow::bail!("Invalid index entry size");
        }

        let read_u32 = |at: usize| NetworkEndian::read_u32(&bytes[at..at + 4]);
        let metadata = EntryMetadata {
            ctime: read_u32(0) as i64,
            ctime_nsec: read_u32(4) as i64,
            mtime: read_u32(8) as i64,
            mtime_nsec: read_u32(12) as i64,
            dev: read_u32(16) as u64,
            ino: read_u32(20) as u64,
            mode: EntryMode::try_from(read_u32(24))?,
            uid: read_u32(28),
            gid: read_u32(32),
            size: read_u32(36) as u64,
        };
        let oid = ObjectId::from_raw(&bytes[40..40 + RAW_OBJECT_ID_LENGTH])?;
        let flags = IndexEntryFlags::from_bits_retain(NetworkEndian::read_u16(&bytes[60..62]));

        let mut cursor = ENTRY_FIXED_SIZE;
        let mut extended_flags = ExtendedFlags::empty();
        if flags.contains(IndexEntryFlags::EXTENDED) {
            if version < 3 {
                anyhow::bail!("extended entry flags in a version {version} index");
            }
            let raw = bytes
                .get(cursor..cursor + 2)
                .context("unexpected EOF in extended flags")?;
            extended_flags = ExtendedFlags::from_bits_retain(NetworkEndian::read_u16(raw));
            cursor += 2;
        }
        let name_start = cursor;

        let (name, consumed) = if version >= 4 {
            let strip = read_prefix_strip(bytes, &mut cursor)?;
            let keep = previous_name
                .len()
                .checked_sub(strip)
                .context("index entry strips more than the previous name")?;
            let suffix_end = find_nul(bytes, cursor)?;
            let mut name = previous_name
                .get(..keep)
                .context("index entry name prefix splits a character")?
                .as_bytes()
                .to_vec();
            name.extend_from_slice(&bytes[cursor..suffix_end]);

            (name, suffix_end + 1)
        } else {
            let name_end = find_nul(bytes, name_start)?;
            let name = bytes[name_start..name_end].to_vec();
            // at least one NUL, padded to the entry block
            let size = (name_end + ENTRY_BLOCK) & !(ENTRY_BLOCK - 1);
            if size > bytes.len() {
                anyhow::bail!("unexpected EOF in index entry padding");
            }

            (name, size)
        };

        let name = String::from_utf8(name).context("Invalid UTF-8 in entry name")?;

        Ok((
            IndexEntry {
                name,
                oid,
                metadata,
                flags,
                extended_flags,
            },
            consumed,
        ))
    }
}

fn find_nul(bytes: &[u8], from: usize) -> anyhow::Result<usize> {
    bytes
        .get(from..)
        .and_then(|rest| rest.iter().position(|&b| b == 0))
        .map(|position| from + position)
        .context("Missing null terminator in entry name")
}

/// Number of bytes to drop from the previous name, in the offset varint encoding
fn read_prefix_strip(bytes: &[u8], cursor: &mut usize) -> anyhow::Result<usize> {
    let mut next = || -> anyhow::Result<u8> {
        let byte = *bytes.get(*cursor).context("unexpected EOF in entry name")?;
        *cursor += 1;
        Ok(byte)
    };

    let mut byte = next()?;
    let mut value = (byte & 0x7f) as usize;
    while byte & 0x80 != 0 {
        byte = next()?;
        value = value
            .checked_add(1)
            .and_then(|v| v.checked_mul(128))
            .context("index entry prefix length overflows")?
            | (byte & 0x7f) as usize;
    }

    Ok(value)
}

impl TryFrom<&Metadata> for EntryMetadata {
    type Error = anyhow::Error;

    /// Stat data of a working tree file, read with `symlink_metadata`
    fn try_from(metadata: &Metadata) -> Result<Self, Self::Error> {
        let file_type = metadata.file_type();
        let mode = if file_type.is_symlink() {
            EntryMode::Symlink
        } else if file_type.is_dir() {
            EntryMode::Directory
        } else if metadata.mode() & 0o111 != 0 {
            EntryMode::File(FileMode::Executable)
        } else {
            EntryMode::File(FileMode::Regular)
        };

        Ok(Self {
            ctime: metadata.ctime(),
            ctime_nsec: metadata.ctime_nsec(),
            mtime: metadata.mtime(),
            mtime_nsec: metadata.mtime_nsec(),
            dev: metadata.dev(),
            ino: metadata.ino(),
            mode,
            uid: metadata.uid(),
            gid: metadata.gid(),
            size: metadata.size(),
        })
    }
}
