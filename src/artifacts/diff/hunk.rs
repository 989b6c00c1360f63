//! Grouping an edit script into hunks
//!
//! Changes closer than twice the context size share a hunk, so the context lines of
//! neighbouring hunks never overlap. Line numbers are 1-based; a side without lines
//! starts at the number of the line preceding the hunk (`-N,0`), as git prints it.

use crate::artifacts::diff::myers::Edit;
use derive_new::new;
use std::fmt;

/// Lines of unchanged context around each change
pub const DEFAULT_CONTEXT: usize = 3;

const NO_NEWLINE_MARKER: &str = "\\ No newline at end of file";

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum LineTag {
    Context,
    Added,
    Removed,
}

impl LineTag {
    pub fn prefix(&self) -> char {
        match self {
            LineTag::Context => ' ',
            LineTag::Added => '+',
            LineTag::Removed => '-',
        }
    }
}

/// A line of a hunk, `text` keeps its line terminator when it had one
#[derive(Debug, Clone, Eq, PartialEq, new)]
pub struct DiffLine {
    pub tag: LineTag,
    pub text: String,
}

impl fmt::Display for DiffLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.tag.prefix(), self.text)?;
        if !self.text.ends_with('\n') {
            writeln!(f)?;
            writeln!(f, "{NO_NEWLINE_MARKER}")?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Hunk {
    pub old_start: usize,
    pub old_lines: usize,
    pub new_start: usize,
    pub new_lines: usize,
    pub lines: Vec<DiffLine>,
}

impl Hunk {
    /// Group `edits` into hunks with `context` lines around every change
    pub fn build(edits: &[Edit<&str>], context: usize) -> Vec<Hunk> {
        let changes = edits
            .iter()
            .enumerate()
            .filter(|(_, edit)| !edit.is_equal())
            .map(|(position, _)| position)
            .collect::<Vec<_>>();

        let Some((&first, rest)) = changes.split_first() else {
            return Vec::new();
        };

        let mut groups = Vec::new();
        let (mut group_start, mut group_end) = (first, first);
        for &change in rest {
            if change - group_end - 1 > 2 * context {
                groups.push((group_start, group_end));
                group_start = change;
            }
            group_end = change;
        }
        groups.push((group_start, group_end));

        groups
            .into_iter()
            .map(|(start, end)| {
                let from = start.saturating_sub(context);
                let to = (end + context + 1).min(edits.len());
                Self::from_edits(&edits[from..to])
            })
            .collect()
    }

    fn from_edits(edits: &[Edit<&str>]) -> Hunk {
        let lines = edits
            .iter()
            .map(|edit| {
                let tag = match edit {
                    Edit::Equal { .. } => LineTag::Context,
                    Edit::Insert { .. } => LineTag::Added,
                    Edit::Delete { .. } => LineTag::Removed,
                };
                DiffLine::new(tag, edit.value().to_string())
            })
            .collect::<Vec<_>>();

        let old_lines = lines.iter().filter(|l| l.tag != LineTag::Added).count();
        let new_lines = lines.iter().filter(|l| l.tag != LineTag::Removed).count();
        let (a_pos, b_pos) = edits
            .first()
            .map(|edit| (edit.a_pos(), edit.b_pos()))
            .unwrap_or_default();

        Hunk {
            old_start: if old_lines == 0 { a_pos } else { a_pos + 1 },
            old_lines,
            new_start: if new_lines == 0 { b_pos } else { b_pos + 1 },
            new_lines,
            lines,
        }
    }

    pub fn header(&self) -> String {
        format!(
            "@@ -{},{} +{},{} @@",
            self.old_start, self.old_lines, self.new_start, self.new_lines
        )
    }

    /// Inclusive 1-based range of old lines the hunk covers, for annotations
    ///
    /// A hunk that only adds lines still points at the line it follows (or the first line).
    pub fn old_line_range(&self) -> (usize, usize) {
        let start = self.old_start.max(1);
        let end = (self.old_start + self.old_lines).saturating_sub(1).max(start);

        (start, end)
    }
}

impl fmt::Display for Hunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header())?;
        for line in &self.lines {
            write!(f, "{line}")?;
        }

        Ok(())
    }
}
