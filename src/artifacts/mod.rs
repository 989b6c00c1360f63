//! Git data structures and algorithms
//!
//! This module contains the core types and algorithms of the check:
//!
//! - `check`: Alerts, sinks, the allow list and the change reporter
//! - `database`: Database entry types and the pack reader
//! - `diff`: Line diffs (Myers' algorithm, hunks, patches)
//! - `index`: Index file data structures
//! - `objects`: Git object types (blob, tree, commit, tag)
//! - `status`: Raw status signals and their classification

pub mod check;
pub mod database;
pub mod diff;
pub mod index;
pub mod objects;
pub mod status;
