//! Glob patterns naming permitted changes
//!
//! A path is allowed when it matches any pattern. `*` and `?` stay within one path
//! component while `**` crosses directories, so `*.new` allows `a.new` but not
//! `dir/a.new`. An empty list allows nothing.

use crate::error::CheckError;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

#[derive(Debug, Clone)]
pub struct AllowList {
    set: GlobSet,
}

impl AllowList {
    /// Compile every pattern, failing on the first invalid one
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self, CheckError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
                .map_err(|source| CheckError::PatternCompile {
                    pattern: pattern.to_string(),
                    source,
                })?;
            builder.add(glob);
        }

        let set = builder.build().map_err(|source| CheckError::PatternCompile {
            pattern: patterns
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<_>>()
                .join("\n"),
            source,
        })?;

        Ok(Self { set })
    }

    pub fn empty() -> Self {
        Self {
            set: GlobSet::empty(),
        }
    }

    pub fn is_allowed(&self, path: &str) -> bool {
        self.set.is_match(path)
    }
}

impl Default for AllowList {
    fn default() -> Self {
        Self::empty()
    }
}
