//! Working tree status against a reference commit
//!
//! - `state_vector`: raw per-path signals (three-flag vectors or short codes)
//! - `change_kind`: the total mapping from a raw signal to a change kind
//! - `status_matrix`: computes three-flag vectors straight from the repository
//! - `short_status`: reads short codes from `git status --porcelain`

pub mod change_kind;
pub mod short_status;
pub mod state_vector;
pub mod status_matrix;
