//! Detect unexpected working tree changes relative to a commit.
//!
//! The crate is organised the same way a small git implementation would be:
//!
//! - `areas`: the parts of a repository on disk (object database, index, refs, workspace)
//! - `artifacts`: data structures and algorithms (objects, index entries, status, diff, check)
//! - `backend`: version-control collaborators feeding the reporter
//! - `commands`: the `check` command wiring everything together
//! - `error`: the error type surfaced by the check

pub mod areas;
pub mod artifacts;
pub mod backend;
pub mod commands;
pub mod error;

pub use artifacts::check::alert::{AlertPayload, AlertProperties, AlertSink};
pub use artifacts::check::reporter::{Outcome, Reporter};
pub use artifacts::status::change_kind::{ChangeKind, classify};
pub use commands::check::{CheckOptions, report};
pub use error::CheckError;
