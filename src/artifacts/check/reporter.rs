//! The change reporter
//!
//! Paths are handled one at a time in enumeration order:
//!
//! 1. unmodified paths are skipped
//! 2. allow-listed paths are skipped, whatever their kind
//! 3. added paths are skipped when new files are ignored
//! 4. unknown statuses become warnings and are never counted
//! 5. anything else is rendered, emitted inside a group and counted once
//!
//! A path whose content cannot be read is still reported and counted, with the alert body
//! replaced by the reason.

use crate::artifacts::check::alert::{AlertPayload, AlertSink};
use crate::artifacts::check::allow_list::AllowList;
use crate::artifacts::check::render::{self, RenderMode};
use crate::artifacts::diff::hunk::DEFAULT_CONTEXT;
use crate::artifacts::diff::patch::Patch;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::status::change_kind::{ChangeKind, classify};
use crate::artifacts::status::state_vector::ChangeRecord;
use crate::backend::VersionControl;
use crate::error::{CheckError, ContentSide};
use std::path::PathBuf;

/// What a run reported
#[derive(Debug, Default)]
pub struct Outcome {
    /// Paths reported as unexpected changes
    pub unexpected_changes: usize,
    /// Alerts handed to the sink, more than `unexpected_changes` when rendering per hunk
    pub alerts: usize,
    /// Paths whose status could not be classified
    pub unknown_statuses: usize,
    /// Content reads that failed and were reported with a degraded body
    pub content_failures: Vec<CheckError>,
}

pub struct Reporter {
    allow_list: AllowList,
    ignore_new_files: bool,
    render_mode: RenderMode,
    context: usize,
}

impl Reporter {
    pub fn new(allow_list: AllowList, ignore_new_files: bool) -> Self {
        Self {
            allow_list,
            ignore_new_files,
            render_mode: RenderMode::default(),
            context: DEFAULT_CONTEXT,
        }
    }

    pub fn with_render_mode(mut self, render_mode: RenderMode) -> Self {
        self.render_mode = render_mode;
        self
    }

    pub fn with_context(mut self, context: usize) -> Self {
        self.context = context;
        self
    }

    pub async fn run(
        &self,
        backend: &impl VersionControl,
        sink: &mut (impl AlertSink + ?Sized),
    ) -> Result<Outcome, CheckError> {
        let records = backend
            .status()
            .await
            .map_err(|source| CheckError::Enumeration {
                directory: backend.directory().to_path_buf(),
                source,
            })?;
        tracing::debug!(records = records.len(), "enumerated status");

        let mut outcome = Outcome::default();
        for record in &records {
            let kind = classify(&record.state);
            let path = record.path.as_str();

            match kind {
                ChangeKind::Unmodified => continue,
                _ if self.allow_list.is_allowed(path) => {
                    tracing::debug!(path, %kind, "allowed change");
                    continue;
                }
                ChangeKind::Added if self.ignore_new_files => {
                    tracing::debug!(path, "ignoring new file");
                    continue;
                }
                ChangeKind::Unknown => {
                    tracing::warn!(path, state = %record.state, "unknown status");
                    sink.warn(&format!("Unknown status {} for {path}", record.state))
                        .map_err(|source| alert_error(path, source))?;
                    outcome.unknown_statuses += 1;
                    continue;
                }
                _ => {}
            }

            let payloads = self.render(backend, record, kind, &mut outcome).await;

            sink.begin_group(&render::group_title(path, kind))
                .map_err(|source| alert_error(path, source))?;
            for payload in &payloads {
                sink.emit(payload)
                    .map_err(|source| alert_error(path, source))?;
            }
            sink.end_group()
                .map_err(|source| alert_error(path, source))?;

            outcome.alerts += payloads.len();
            outcome.unexpected_changes += 1;
        }

        tracing::debug!(
            unexpected = outcome.unexpected_changes,
            alerts = outcome.alerts,
            unknown = outcome.unknown_statuses,
            "report finished"
        );

        Ok(outcome)
    }

    async fn render(
        &self,
        backend: &impl VersionControl,
        record: &ChangeRecord,
        kind: ChangeKind,
        outcome: &mut Outcome,
    ) -> Vec<AlertPayload> {
        let path = record.path.as_str();
        let rendered = match kind {
            ChangeKind::Added => read_text(backend, path, ContentSide::Workdir)
                .await
                .map(|content| vec![render::added(path, &content)]),
            ChangeKind::Deleted => read_text(backend, path, ContentSide::Committed)
                .await
                .map(|content| vec![render::deleted(path, &content)]),
            _ => match read_text(backend, path, ContentSide::Committed).await {
                Ok(old) => read_text(backend, path, ContentSide::Workdir)
                    .await
                    .map(|new| {
                        let patch = Patch::compute(&old, &new, self.context);
                        render::modified(path, &patch, self.render_mode)
                    }),
                Err(err) => Err(err),
            },
        };

        rendered.unwrap_or_else(|(side, source)| {
            let reason = format!("{source:#}");
            tracing::warn!(path, %side, reason = %reason, "content unavailable");
            outcome.content_failures.push(CheckError::ContentRead {
                path: PathBuf::from(path),
                side,
                source,
            });
            vec![render::unavailable(path, kind, &reason)]
        })
    }
}

async fn read_text(
    backend: &impl VersionControl,
    path: &str,
    side: ContentSide,
) -> Result<String, (ContentSide, anyhow::Error)> {
    let content = match side {
        ContentSide::Committed => backend.read_committed(path).await,
        ContentSide::Workdir => backend.read_workdir(path).await,
    }
    .map_err(|err| (side, err))?;

    Blob::new(content).to_text().map_err(|err| (side, err))
}

fn alert_error(path: &str, source: anyhow::Error) -> CheckError {
    CheckError::Alert {
        path: PathBuf::from(path),
        source,
    }
}
