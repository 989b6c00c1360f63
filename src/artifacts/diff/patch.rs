//! Line diff of two texts
//!
//! Texts are split after every `\n`, so lines compare with their terminator and a
//! missing final newline shows up as a changed last line.

use crate::artifacts::diff::hunk::{Hunk, LineTag};
use crate::artifacts::diff::myers::{MAX_EDIT_DISTANCE, diff_sequences};
use anyhow::Context;
use std::fmt;

pub fn split_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Patch {
    hunks: Vec<Hunk>,
}

impl Patch {
    pub fn compute(old: &str, new: &str, context: usize) -> Self {
        let (a, b) = (split_lines(old), split_lines(new));
        let edits = diff_sequences(&a, &b, MAX_EDIT_DISTANCE);

        Patch {
            hunks: Hunk::build(&edits, context),
        }
    }

    pub fn hunks(&self) -> &[Hunk] {
        &self.hunks
    }

    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    /// Replay the hunks on `old`, checking every context and removed line
    pub fn apply(&self, old: &str) -> anyhow::Result<String> {
        let old_lines = split_lines(old);
        let mut output = String::with_capacity(old.len());
        let mut cursor = 0;

        for hunk in &self.hunks {
            // a hunk without old lines starts after its `old_start`
            let start = match hunk.old_lines {
                0 => hunk.old_start,
                _ => hunk.old_start - 1,
            };
            if start < cursor || start > old_lines.len() {
                anyhow::bail!("hunk {} does not fit the old text", hunk.header());
            }
            old_lines[cursor..start]
                .iter()
                .for_each(|line| output.push_str(line));
            cursor = start;

            for line in &hunk.lines {
                if line.tag != LineTag::Added {
                    let expected = old_lines
                        .get(cursor)
                        .with_context(|| format!("hunk {} runs past the old text", hunk.header()))?;
                    if *expected != line.text {
                        anyhow::bail!(
                            "hunk {} expects {:?} at old line {}, found {expected:?}",
                            hunk.header(),
                            line.text,
                            cursor + 1
                        );
                    }
                    cursor += 1;
                }
                if line.tag != LineTag::Removed {
                    output.push_str(&line.text);
                }
            }
        }

        old_lines[cursor..]
            .iter()
            .for_each(|line| output.push_str(line));

        Ok(output)
    }
}

impl fmt::Display for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for hunk in &self.hunks {
            write!(f, "{hunk}")?;
        }

        Ok(())
    }
}
