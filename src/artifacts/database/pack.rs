//! Pack files
//!
//! Freshly cloned repositories (and every repository after `git gc`) keep most
//! objects in `objects/pack/pack-<sha>.pack`, located through a companion `.idx`.
//!
//! ## Index format (version 2)
//!
//! ```text
//! \377tOc | version (2) | fanout[256] | sha1[N] | crc32[N] | offset32[N] | offset64[M]
//! ```
//!
//! ## Pack entries
//!
//! Each entry starts with a variable-length header holding the type (3 bits) and the
//! inflated size, followed by a zlib stream. Delta entries reference their base either
//! by a negative offset inside the same pack (`OFS_DELTA`) or by object id (`REF_DELTA`).

use crate::artifacts::objects::RAW_OBJECT_ID_LENGTH;
use crate::artifacts::objects::object::RawObject;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use byteorder::{ByteOrder, NetworkEndian};
use bytes::Bytes;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

const INDEX_SIGNATURE: [u8; 4] = [0xff, b't', b'O', b'c'];
const INDEX_VERSION: u32 = 2;
const FANOUT_ENTRIES: usize = 256;
const LARGE_OFFSET_FLAG: u32 = 0x8000_0000;

const OFS_DELTA: u8 = 6;
const REF_DELTA: u8 = 7;

/// In-memory pack index
#[derive(Debug, Clone)]
pub struct PackIndex {
    fanout: Vec<u32>,
    oids: Vec<[u8; RAW_OBJECT_ID_LENGTH]>,
    offsets: Vec<u64>,
}

impl PackIndex {
    pub fn parse(data: &[u8]) -> anyhow::Result<Self> {
        let header_size = 8 + FANOUT_ENTRIES * 4;
        if data.len() < header_size {
            anyhow::bail!("pack index is truncated");
        }
        if data[0..4] != INDEX_SIGNATURE {
            anyhow::bail!("unsupported pack index signature (only version 2 is read)");
        }
        let version = NetworkEndian::read_u32(&data[4..8]);
        if version != INDEX_VERSION {
            anyhow::bail!("unsupported pack index version {version}");
        }

        let fanout = (0..FANOUT_ENTRIES)
            .map(|i| NetworkEndian::read_u32(&data[8 + i * 4..12 + i * 4]))
            .collect::<Vec<_>>();
        let count = fanout[FANOUT_ENTRIES - 1] as usize;

        let oids_start = header_size;
        let crcs_start = oids_start + count * RAW_OBJECT_ID_LENGTH;
        let offsets_start = crcs_start + count * 4;
        let large_offsets_start = offsets_start + count * 4;
        // the trailer carries the pack checksum and the index checksum
        if data.len() < large_offsets_start + 2 * RAW_OBJECT_ID_LENGTH {
            anyhow::bail!("pack index is truncated");
        }

        let oids = (0..count)
            .map(|i| {
                let start = oids_start + i * RAW_OBJECT_ID_LENGTH;
                let mut oid = [0u8; RAW_OBJECT_ID_LENGTH];
                oid.copy_from_slice(&data[start..start + RAW_OBJECT_ID_LENGTH]);
                oid
            })
            .collect::<Vec<_>>();

        let offsets = (0..count)
            .map(|i| {
                let start = offsets_start + i * 4;
                let offset = NetworkEndian::read_u32(&data[start..start + 4]);
                if offset & LARGE_OFFSET_FLAG == 0 {
                    return Ok(offset as u64);
                }

                let large_start = large_offsets_start + (offset & !LARGE_OFFSET_FLAG) as usize * 8;
                data.get(large_start..large_start + 8)
                    .map(NetworkEndian::read_u64)
                    .context("pack index large offset is out of bounds")
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(PackIndex {
            fanout,
            oids,
            offsets,
        })
    }

    pub fn len(&self) -> usize {
        self.oids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.oids.is_empty()
    }

    /// Offset of `oid` inside the pack, if the pack holds it
    pub fn lookup(&self, oid: &ObjectId) -> anyhow::Result<Option<u64>> {
        let raw = oid.to_raw()?;
        let first = raw[0] as usize;
        let low = if first == 0 {
            0
        } else {
            self.fanout[first - 1] as usize
        };
        let high = self.fanout[first] as usize;

        Ok(self
            .oids
            .get(low..high)
            .and_then(|candidates| candidates.binary_search(&raw).ok())
            .map(|position| self.offsets[low + position]))
    }
}

/// A pack entry before delta resolution
#[derive(Debug, Clone)]
pub enum PackEntry {
    Whole(RawObject),
    OfsDelta { base_offset: u64, delta: Bytes },
    RefDelta { base: ObjectId, delta: Bytes },
}

/// A `.pack` file together with its index
#[derive(Debug)]
pub struct Pack {
    pack_path: PathBuf,
    index: PackIndex,
}

impl Pack {
    /// Load the index next to `pack_path` (`pack-<sha>.idx`)
    pub fn open(pack_path: &Path) -> anyhow::Result<Self> {
        let index_path = pack_path.with_extension("idx");
        let index_data = std::fs::read(&index_path)
            .with_context(|| format!("Unable to read pack index {}", index_path.display()))?;
        let index = PackIndex::parse(&index_data)
            .with_context(|| format!("Invalid pack index {}", index_path.display()))?;

        Ok(Pack {
            pack_path: pack_path.to_path_buf(),
            index,
        })
    }

    pub fn path(&self) -> &Path {
        &self.pack_path
    }

    pub fn index(&self) -> &PackIndex {
        &self.index
    }

    pub fn read_entry(&self, offset: u64) -> anyhow::Result<PackEntry> {
        let mut file = File::open(&self.pack_path)
            .with_context(|| format!("Unable to open pack {}", self.pack_path.display()))?;
        file.seek(SeekFrom::Start(offset))?;
        let mut reader = BufReader::new(file);

        let (type_code, size) = read_entry_header(&mut reader)?;

        match type_code {
            OFS_DELTA => {
                let distance = read_base_distance(&mut reader)?;
                let base_offset = offset
                    .checked_sub(distance)
                    .context("delta base offset points before the pack start")?;
                Ok(PackEntry::OfsDelta {
                    base_offset,
                    delta: inflate(&mut reader, size)?,
                })
            }
            REF_DELTA => {
                let base = ObjectId::read_h40_from(&mut reader)?;
                Ok(PackEntry::RefDelta {
                    base,
                    delta: inflate(&mut reader, size)?,
                })
            }
            code => {
                let object_type = ObjectType::from_pack_code(code)?;
                Ok(PackEntry::Whole(RawObject::new(
                    object_type,
                    inflate(&mut reader, size)?,
                )))
            }
        }
    }
}

fn read_byte(reader: &mut impl Read) -> anyhow::Result<u8> {
    let mut byte = [0u8; 1];
    reader
        .read_exact(&mut byte)
        .context("unexpected EOF in pack entry")?;
    Ok(byte[0])
}

/// Type in bits 4-6 of the first byte, size in its low nibble plus 7 bits per
/// continuation byte
fn read_entry_header(reader: &mut impl Read) -> anyhow::Result<(u8, usize)> {
    let mut byte = read_byte(reader)?;
    let type_code = (byte >> 4) & 0x07;
    let mut size = (byte & 0x0f) as u64;
    let mut shift = 4;

    while byte & 0x80 != 0 {
        if shift > 57 {
            anyhow::bail!("pack entry size overflows");
        }
        byte = read_byte(reader)?;
        size |= ((byte & 0x7f) as u64) << shift;
        shift += 7;
    }

    Ok((type_code, usize::try_from(size)?))
}

/// Big-endian base-128 distance where every continuation adds one
fn read_base_distance(reader: &mut impl Read) -> anyhow::Result<u64> {
    let mut byte = read_byte(reader)?;
    let mut distance = (byte & 0x7f) as u64;

    while byte & 0x80 != 0 {
        if distance > (u64::MAX >> 8) {
            anyhow::bail!("delta base offset overflows");
        }
        byte = read_byte(reader)?;
        distance = ((distance + 1) << 7) | (byte & 0x7f) as u64;
    }

    Ok(distance)
}

fn inflate(reader: &mut impl BufRead, size: usize) -> anyhow::Result<Bytes> {
    let mut decoder = flate2::bufread::ZlibDecoder::new(reader);
    let mut data = Vec::with_capacity(size);
    decoder
        .read_to_end(&mut data)
        .context("Unable to decompress pack entry")?;

    if data.len() != size {
        anyhow::bail!(
            "pack entry inflated to {} bytes, expected {size}",
            data.len()
        );
    }

    Ok(data.into())
}

/// Little-endian base-128 size at the start of a delta
fn read_delta_size(delta: &[u8], cursor: &mut usize) -> anyhow::Result<usize> {
    let mut size = 0usize;
    let mut shift = 0;

    loop {
        let byte = *delta.get(*cursor).context("truncated delta header")?;
        *cursor += 1;
        if shift > 56 {
            anyhow::bail!("delta size overflows");
        }
        size |= ((byte & 0x7f) as usize) << shift;
        shift += 7;

        if byte & 0x80 == 0 {
            return Ok(size);
        }
    }
}

/// Rebuild an object from its base and a git delta
///
/// A delta is a list of instructions: copy a range of the base (high bit set)
/// or insert the next `n` literal bytes.
pub fn apply_delta(base: &[u8], delta: &[u8]) -> anyhow::Result<Vec<u8>> {
    let mut cursor = 0;
    let source_size = read_delta_size(delta, &mut cursor)?;
    if source_size != base.len() {
        anyhow::bail!(
            "delta expects a {source_size} byte base, found {} bytes",
            base.len()
        );
    }
    let target_size = read_delta_size(delta, &mut cursor)?;
    let mut target = Vec::with_capacity(target_size);

    while cursor < delta.len() {
        let instruction = delta[cursor];
        cursor += 1;

        if instruction & 0x80 != 0 {
            let mut offset = 0usize;
            for i in 0..4 {
                if instruction & (1 << i) != 0 {
                    let byte = *delta.get(cursor).context("truncated delta copy")?;
                    offset |= (byte as usize) << (8 * i);
                    cursor += 1;
                }
            }

            let mut size = 0usize;
            for i in 0..3 {
                if instruction & (0x10 << i) != 0 {
                    let byte = *delta.get(cursor).context("truncated delta copy")?;
                    size |= (byte as usize) << (8 * i);
                    cursor += 1;
                }
            }
            if size == 0 {
                size = 0x10000;
            }

            let range = base
                .get(offset..offset.saturating_add(size))
                .context("delta copies outside of its base")?;
            target.extend_from_slice(range);
        } else if instruction != 0 {
            let size = instruction as usize;
            let literal = delta
                .get(cursor..cursor + size)
                .context("truncated delta insert")?;
            target.extend_from_slice(literal);
            cursor += size;
        } else {
            anyhow::bail!("reserved delta instruction");
        }
    }

    if target.len() != target_size {
        anyhow::bail!(
            "delta produced {} bytes, expected {target_size}",
            target.len()
        );
    }

    Ok(target)
}
