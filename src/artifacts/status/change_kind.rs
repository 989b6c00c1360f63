//! Mapping raw status signals onto change kinds
//!
//! Every state maps to exactly one kind. Combinations with no sensible meaning for a
//! commit-versus-working-tree check are `Unknown` and surface as warnings.

use crate::artifacts::status::state_vector::{
    ChangeState, HeadState, StageState, StateVector, WorkdirState,
};
use std::fmt;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ChangeKind {
    Unmodified,
    Added,
    Deleted,
    Modified,
    Unknown,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Unmodified => "unmodified",
            ChangeKind::Added => "added",
            ChangeKind::Deleted => "deleted",
            ChangeKind::Modified => "modified",
            ChangeKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Short status codes (`XY` of `git status --short`) that carry a change kind
///
/// Unmerged pairs, renames, copies and anything unlisted are `Unknown`.
const SHORT_CODES: phf::Map<&'static str, ChangeKind> = phf::phf_map! {
    "??" => ChangeKind::Added,
    "A " => ChangeKind::Added,
    "AM" => ChangeKind::Added,
    "AD" => ChangeKind::Added,
    "AT" => ChangeKind::Added,
    " M" => ChangeKind::Modified,
    "M " => ChangeKind::Modified,
    "MM" => ChangeKind::Modified,
    " T" => ChangeKind::Modified,
    "T " => ChangeKind::Modified,
    "MT" => ChangeKind::Modified,
    "TM" => ChangeKind::Modified,
    "D " => ChangeKind::Deleted,
    " D" => ChangeKind::Deleted,
    "MD" => ChangeKind::Deleted,
    "TD" => ChangeKind::Deleted,
};

pub fn classify(state: &ChangeState) -> ChangeKind {
    match state {
        ChangeState::Matrix(vector) => classify_vector(vector),
        ChangeState::ShortCode(code) => classify_short_code(code),
    }
}

/// Rules are evaluated in order, the first match wins
pub fn classify_vector(vector: &StateVector) -> ChangeKind {
    use HeadState as H;
    use StageState as S;
    use WorkdirState as W;

    match (vector.head, vector.workdir, vector.stage) {
        (_, _, S::Conflicted) => ChangeKind::Unknown,
        (H::Present, W::Unchanged, S::Unchanged) => ChangeKind::Unmodified,
        (H::Absent, workdir, stage) if workdir != W::Absent || stage != S::Absent => {
            ChangeKind::Added
        }
        (H::Present, W::Changed, _) => ChangeKind::Modified,
        (H::Present, W::Absent, _) | (H::Present, _, S::Absent) => ChangeKind::Deleted,
        _ => ChangeKind::Unknown,
    }
}

pub fn classify_short_code(code: &str) -> ChangeKind {
    SHORT_CODES.get(code).copied().unwrap_or(ChangeKind::Unknown)
}
