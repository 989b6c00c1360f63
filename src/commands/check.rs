//! The `check` command
//!
//! Wires an allow list, a backend and a reporter together. Deciding the exit status is
//! left to the caller; [`conclude`] only reports the failure through the sink.

use crate::artifacts::check::alert::AlertSink;
use crate::artifacts::check::allow_list::AllowList;
use crate::artifacts::check::render::{self, RenderMode};
use crate::artifacts::check::reporter::{Outcome, Reporter};
use crate::artifacts::diff::hunk::DEFAULT_CONTEXT;
use crate::backend::{Backend, BackendKind};
use crate::error::CheckError;
use anyhow::Context;
use derive_new::new;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Name of the step output holding the count
pub const COUNT_OUTPUT_NAME: &str = "unexpected-changes-count";

#[derive(Debug, Clone, new)]
pub struct CheckOptions {
    /// Revision the working tree is compared against
    pub reference: String,
    pub directory: PathBuf,
    pub allowed_changes: Vec<String>,
    pub ignore_new_files: bool,
    #[new(default)]
    pub continue_with_unexpected_changes: bool,
    #[new(default)]
    pub render_mode: RenderMode,
    #[new(value = "DEFAULT_CONTEXT")]
    pub context: usize,
    #[new(default)]
    pub backend: BackendKind,
}

/// Report unexpected changes of `directory` relative to `reference`, returning their count
pub async fn report(
    reference: &str,
    directory: &Path,
    allow_patterns: &[String],
    ignore_new_files: bool,
    sink: &mut (impl AlertSink + ?Sized),
) -> Result<usize, CheckError> {
    let options = CheckOptions::new(
        reference.to_string(),
        directory.to_path_buf(),
        allow_patterns.to_vec(),
        ignore_new_files,
    );

    run(&options, sink)
        .await
        .map(|outcome| outcome.unexpected_changes)
}

pub async fn run(
    options: &CheckOptions,
    sink: &mut (impl AlertSink + ?Sized),
) -> Result<Outcome, CheckError> {
    tracing::debug!(
        sha = %options.reference,
        dir = %options.directory.display(),
        ignore_new_files = options.ignore_new_files,
        allowed_changes = ?options.allowed_changes,
        render = ?options.render_mode,
        context = options.context,
        backend = ?options.backend,
        "options"
    );

    let allow_list = AllowList::compile(&options.allowed_changes)?;

    let backend = Backend::open(options.backend, &options.directory, &options.reference)
        .await
        .map_err(|source| CheckError::Enumeration {
            directory: options.directory.clone(),
            source,
        })?;

    Reporter::new(allow_list, options.ignore_new_files)
        .with_render_mode(options.render_mode)
        .with_context(options.context)
        .run(&backend, sink)
        .await
}

/// Report the failure through the sink when unexpected changes should fail the run
///
/// Returns whether the run failed.
pub fn conclude(
    outcome: &Outcome,
    continue_with_unexpected_changes: bool,
    sink: &mut (impl AlertSink + ?Sized),
) -> anyhow::Result<bool> {
    if continue_with_unexpected_changes || outcome.unexpected_changes == 0 {
        return Ok(false);
    }

    sink.fail(&render::fail_message(outcome.unexpected_changes))?;
    Ok(true)
}

/// Split a multiline input into trimmed, non-empty lines
pub fn split_multiline<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    values
        .iter()
        .flat_map(|value| value.as_ref().lines())
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Append the count to a GitHub Actions output file
pub fn write_count_output(output_file: &Path, count: usize) -> anyhow::Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(output_file)
        .with_context(|| format!("Unable to open output file {}", output_file.display()))?;

    writeln!(file, "{COUNT_OUTPUT_NAME}={count}")
        .with_context(|| format!("Unable to write output file {}", output_file.display()))?;

    Ok(())
}
