//! Git index file format
//!
//! The index (also called staging area or cache) records the content staged for the
//! next commit. It is only ever read here.
//!
//! ## File Format
//!
//! ```text
//! Header (12 bytes):
//!   - Signature: "DIRC" (4 bytes)
//!   - Version: 2, 3 or 4 (4 bytes)
//!   - Entry count (4 bytes)
//!
//! Entries (variable length)
//!
//! Extensions (optional):
//!   - Signature (4 bytes) | size (4 bytes) | data
//!
//! Checksum (20 bytes):
//!   - SHA-1 hash of all preceding bytes
//! ```

pub mod entry_mode;
pub mod index_entry;
pub mod index_header;

/// Size of SHA-1 checksum in bytes
pub const CHECKSUM_SIZE: usize = 20;

/// Size of index header in bytes
pub const HEADER_SIZE: usize = 12;

/// Magic signature identifying index files
pub const SIGNATURE: &str = "DIRC";

/// Index format versions that can be read
pub const SUPPORTED_VERSIONS: std::ops::RangeInclusive<u32> = 2..=4;
