//! Line diffs
//!
//! - `myers`: Myers' shortest edit script, with prefix/suffix trimming and a distance bound
//! - `hunk`: grouping an edit script into hunks with surrounding context
//! - `patch`: the diff of two texts, rendered as `@@` hunks

pub mod hunk;
pub mod myers;
pub mod patch;
