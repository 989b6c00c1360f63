use crate::artifacts::index::{HEADER_SIZE, SIGNATURE, SUPPORTED_VERSIONS};
use crate::artifacts::objects::object::Unpackable;
use byteorder::{ByteOrder, NetworkEndian};
use std::io::BufRead;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct IndexHeader {
    pub version: u32,
    pub entries_count: u32,
}

impl Unpackable for IndexHeader {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut bytes = [0u8; HEADER_SIZE];
        reader
            .read_exact(&mut bytes)
            .map_err(|_| anyhow::anyhow!("Index file is too short"))?;

        if &bytes[0..4] != SIGNATURE.as_bytes() {
            anyhow::bail!("Invalid index file signature");
        }

        let version = NetworkEndian::read_u32(&bytes[4..8]);
        if !SUPPORTED_VERSIONS.contains(&version) {
            anyhow::bail!("Unsupported index file version: {version}");
        }

        Ok(IndexHeader {
            version,
            entries_count: NetworkEndian::read_u32(&bytes[8..12]),
        })
    }
}
