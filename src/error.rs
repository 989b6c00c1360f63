//! Error types for the status check.
//!
//! Only enumeration, pattern and sink failures abort a run. Content-read failures are
//! path-scoped: the reporter degrades the alert body, keeps counting and records the
//! error in its outcome.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which side of a change a content read was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSide {
    /// Blob stored in the reference commit
    Committed,
    /// File currently in the working tree
    Workdir,
}

impl fmt::Display for ContentSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentSide::Committed => write!(f, "committed"),
            ContentSide::Workdir => write!(f, "working tree"),
        }
    }
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CheckError {
    /// The repository status could not be obtained at all
    #[error("Unable to read repository status in {}", directory.display())]
    Enumeration {
        directory: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// An allow-list pattern is not a valid glob
    #[error("Invalid allowed-changes pattern {pattern:?}")]
    PatternCompile {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// Content for a single path could not be read or decoded
    #[error("Unable to read {side} content of {}", path.display())]
    ContentRead {
        path: PathBuf,
        side: ContentSide,
        #[source]
        source: anyhow::Error,
    },

    /// The alert sink refused a write
    #[error("Unable to emit alert for {}", path.display())]
    Alert {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}
