//! Database entry types
//!
//! This module contains types used when reading objects from the database:
//! entries of flattened trees and the pack file reader.

pub mod database_entry;
pub mod pack;
