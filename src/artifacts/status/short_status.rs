//! Parser for `git status --porcelain=v1 -z` output
//!
//! Each entry is `XY <path>`, NUL-terminated with the path verbatim. A rename or copy is
//! followed by a second field holding its origin.

use crate::artifacts::status::state_vector::{ChangeRecord, ChangeState};
use anyhow::Context;

/// Length of the `XY ` prefix
const CODE_PREFIX: usize = 3;

fn is_rename_or_copy(code: &str) -> bool {
    code.contains(['R', 'C'])
}

fn split_entry(entry: &str) -> anyhow::Result<(&str, &str)> {
    if entry.len() < CODE_PREFIX + 1 || entry.as_bytes()[2] != b' ' || !entry.is_char_boundary(2) {
        anyhow::bail!("Malformed status entry {entry:?}");
    }

    Ok((&entry[..2], &entry[CODE_PREFIX..]))
}

/// Parse `git status --porcelain=v1 -z`
pub fn parse_nul_terminated(output: &[u8]) -> anyhow::Result<Vec<ChangeRecord>> {
    let mut records = Vec::new();
    let mut fields = output.split(|&byte| byte == 0).filter(|f| !f.is_empty());

    while let Some(field) = fields.next() {
        let entry = std::str::from_utf8(field).context("status entry is not valid UTF-8")?;
        let (code, path) = split_entry(entry)?;

        if is_rename_or_copy(code) {
            // the origin path follows as its own field
            fields
                .next()
                .with_context(|| format!("rename of {path:?} has no origin"))?;
        }

        records.push(ChangeRecord::new(
            path.to_string(),
            ChangeState::ShortCode(code.to_string()),
        ));
    }

    Ok(records)
}
