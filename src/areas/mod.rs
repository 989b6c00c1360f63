//! Core repository components
//!
//! This module contains the read-only building blocks of a Git repository:
//!
//! - `database`: Object database (loose objects and packs)
//! - `index`: Staging area, source of the stage column and the stat cache
//! - `refs`: Reference resolution (HEAD, branches, tags, packed-refs)
//! - `repository`: Repository discovery and coordination
//! - `workspace`: Working directory listing and reads, honouring ignore rules

pub(crate) mod database;
pub(crate) mod index;
pub(crate) mod refs;
pub mod repository;
pub(crate) mod workspace;
