//! Alert payloads for each kind of change
//!
//! Added and deleted files carry their whole content. Modified files carry a line diff,
//! either as one patch per file or as one annotation per hunk pointing at the old lines.

use crate::artifacts::check::alert::{AlertPayload, AlertProperties};
use crate::artifacts::diff::patch::Patch;
use crate::artifacts::status::change_kind::ChangeKind;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum RenderMode {
    /// One alert per file holding every hunk
    #[default]
    Patch,
    /// One alert per hunk, annotated with the old line range
    Hunks,
}

const ADDED_TITLE: &str = "Unexpected file added";
const DELETED_TITLE: &str = "Unexpected file deleted";
const MODIFIED_TITLE: &str = "Unexpected file modified";

fn header(kind: ChangeKind) -> &'static str {
    match kind {
        ChangeKind::Added => "File added:",
        ChangeKind::Deleted => "File deleted:",
        _ => "File modified:",
    }
}

fn title(kind: ChangeKind) -> &'static str {
    match kind {
        ChangeKind::Added => ADDED_TITLE,
        ChangeKind::Deleted => DELETED_TITLE,
        _ => MODIFIED_TITLE,
    }
}

/// Title of the group wrapping every alert of a path
pub fn group_title(path: &str, kind: ChangeKind) -> String {
    format!("{path} --- file {kind}")
}

pub fn fail_message(count: usize) -> String {
    format!("Unexpected changes detected: {count}. See file annotations for details.")
}

pub fn added(path: &str, content: &str) -> AlertPayload {
    AlertPayload::new(
        format!("{}\n{content}", header(ChangeKind::Added)),
        AlertProperties::new(path.to_string(), ADDED_TITLE.to_string()),
    )
}

pub fn deleted(path: &str, content: &str) -> AlertPayload {
    AlertPayload::new(
        format!("{}\n{content}", header(ChangeKind::Deleted)),
        AlertProperties::new(path.to_string(), DELETED_TITLE.to_string()),
    )
}

/// Alerts for a modified file
///
/// A change that leaves every line intact (a mode or type change) still yields one alert,
/// so each counted path is visible.
pub fn modified(path: &str, patch: &Patch, mode: RenderMode) -> Vec<AlertPayload> {
    let whole_file = |body: String| {
        AlertPayload::new(
            format!("{}\n{body}", header(ChangeKind::Modified)),
            AlertProperties::new(path.to_string(), MODIFIED_TITLE.to_string()),
        )
    };

    if patch.is_empty() {
        return vec![whole_file("(no line changes)".to_string())];
    }

    match mode {
        RenderMode::Patch => vec![whole_file(patch.to_string())],
        RenderMode::Hunks => patch
            .hunks()
            .iter()
            .map(|hunk| {
                let (start, end) = hunk.old_line_range();
                AlertPayload::new(
                    format!("```diff\n{hunk}```"),
                    AlertProperties::new(path.to_string(), format!("Unexpected change in {path}"))
                        .with_lines(start, end),
                )
            })
            .collect(),
    }
}

/// Alert for a change whose content could not be read
pub fn unavailable(path: &str, kind: ChangeKind, reason: &str) -> AlertPayload {
    AlertPayload::new(
        format!("{}\n(content unavailable: {reason})", header(kind)),
        AlertProperties::new(path.to_string(), title(kind).to_string()),
    )
}
