use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Result;
use bytes::Bytes;
use derive_new::new;
use sha1::{Digest, Sha1};
use std::io::BufRead;

pub trait Unpackable {
    fn deserialize(reader: impl BufRead) -> Result<Self>
    where
        Self: Sized;
}

/// An inflated object: its type and its payload without the header
#[derive(Debug, Clone, new)]
pub struct RawObject {
    pub object_type: ObjectType,
    pub data: Bytes,
}

impl RawObject {
    pub fn object_id(&self) -> Result<ObjectId> {
        hash_object(self.object_type, &self.data)
    }
}

/// Compute the id git would give `data` stored as an object of `object_type`
///
/// The hash covers `<type> <size>\0<data>`.
pub fn hash_object(object_type: ObjectType, data: &[u8]) -> Result<ObjectId> {
    let mut hasher = Sha1::new();
    hasher.update(format!("{} {}\0", object_type.as_str(), data.len()).as_bytes());
    hasher.update(data);

    ObjectId::from_raw(hasher.finalize().as_slice())
}
