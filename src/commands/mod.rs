//! Command implementations
//!
//! - `check`: compare the working tree against a commit and report unexpected changes

pub mod check;
