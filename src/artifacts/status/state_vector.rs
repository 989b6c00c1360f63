//! Raw per-path status signals
//!
//! A backend describes each path either with a three-flag state vector (reference
//! commit, working tree and index compared against the reference) or with the
//! two-character code of `git status --short`.

use derive_new::new;
use std::fmt;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum HeadState {
    Absent,
    Present,
}

/// Working tree compared against the reference commit
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum WorkdirState {
    Absent,
    Unchanged,
    Changed,
}

/// Index compared against the reference commit
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum StageState {
    Absent,
    Unchanged,
    Changed,
    /// Unmerged entries (stages 1-3) are present
    Conflicted,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, new)]
pub struct StateVector {
    pub head: HeadState,
    pub workdir: WorkdirState,
    pub stage: StageState,
}

impl fmt::Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head = match self.head {
            HeadState::Absent => "absent",
            HeadState::Present => "present",
        };
        let workdir = match self.workdir {
            WorkdirState::Absent => "absent",
            WorkdirState::Unchanged => "unchanged",
            WorkdirState::Changed => "changed",
        };
        let stage = match self.stage {
            StageState::Absent => "absent",
            StageState::Unchanged => "unchanged",
            StageState::Changed => "changed",
            StageState::Conflicted => "conflicted",
        };

        write!(f, "head {head}, workdir {workdir}, stage {stage}")
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum ChangeState {
    Matrix(StateVector),
    ShortCode(String),
}

impl fmt::Display for ChangeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeState::Matrix(vector) => write!(f, "[{vector}]"),
            ChangeState::ShortCode(code) => write!(f, "{code:?}"),
        }
    }
}

/// One entry of a status enumeration
#[derive(Debug, Clone, Eq, PartialEq, Hash, new)]
pub struct ChangeRecord {
    /// Repository-relative, `/`-separated
    pub path: String,
    pub state: ChangeState,
}
