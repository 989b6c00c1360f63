//! Alert payloads and the sink they are delivered to
//!
//! The reporter never prints. Every user-visible outcome goes through an [`AlertSink`],
//! which lets the binary pick GitHub workflow commands or console output and lets tests
//! record what would have been shown.

use derive_new::new;
use std::fmt;

/// Annotation properties attached to an alert
#[derive(Debug, Clone, Eq, PartialEq, new)]
pub struct AlertProperties {
    pub file: String,
    pub title: String,
    /// First annotated line, 1-based, only set for per-hunk alerts
    #[new(default)]
    pub start_line: Option<usize>,
    /// Last annotated line, inclusive
    #[new(default)]
    pub end_line: Option<usize>,
}

impl AlertProperties {
    pub fn with_lines(mut self, start_line: usize, end_line: usize) -> Self {
        self.start_line = Some(start_line);
        self.end_line = Some(end_line.max(start_line));
        self
    }
}

#[derive(Debug, Clone, Eq, PartialEq, new)]
pub struct AlertPayload {
    pub message: String,
    pub properties: AlertProperties,
}

impl fmt::Display for AlertPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.properties.title, self.properties.file)?;
        if let (Some(start), Some(end)) = (self.properties.start_line, self.properties.end_line) {
            write!(f, " (lines {start}-{end})")?;
        }

        Ok(())
    }
}

/// Receiver of everything a check run reports
pub trait AlertSink {
    /// Report one unexpected change
    fn emit(&mut self, payload: &AlertPayload) -> anyhow::Result<()>;

    /// Report a non-fatal problem, such as a status that could not be classified
    fn warn(&mut self, message: &str) -> anyhow::Result<()>;

    /// Start a collapsible group; alerts for one path are emitted inside it
    fn begin_group(&mut self, title: &str) -> anyhow::Result<()>;

    fn end_group(&mut self) -> anyhow::Result<()>;

    /// Mark the whole run as failed
    fn fail(&mut self, message: &str) -> anyhow::Result<()>;
}

impl<S: AlertSink + ?Sized> AlertSink for Box<S> {
    fn emit(&mut self, payload: &AlertPayload) -> anyhow::Result<()> {
        (**self).emit(payload)
    }

    fn warn(&mut self, message: &str) -> anyhow::Result<()> {
        (**self).warn(message)
    }

    fn begin_group(&mut self, title: &str) -> anyhow::Result<()> {
        (**self).begin_group(title)
    }

    fn end_group(&mut self) -> anyhow::Result<()> {
        (**self).end_group()
    }

    fn fail(&mut self, message: &str) -> anyhow::Result<()> {
        (**self).fail(message)
    }
}

/// Sink keeping everything in memory
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub payloads: Vec<AlertPayload>,
    pub warnings: Vec<String>,
    pub groups: Vec<String>,
    pub failures: Vec<String>,
    open_groups: usize,
}

impl MemorySink {
    pub fn messages(&self) -> Vec<&str> {
        self.payloads
            .iter()
            .map(|payload| payload.message.as_str())
            .collect()
    }

    pub fn files(&self) -> Vec<&str> {
        self.payloads
            .iter()
            .map(|payload| payload.properties.file.as_str())
            .collect()
    }

    /// Groups begun but never ended
    pub fn open_groups(&self) -> usize {
        self.open_groups
    }
}

impl AlertSink for MemorySink {
    fn emit(&mut self, payload: &AlertPayload) -> anyhow::Result<()> {
        self.payloads.push(payload.clone());
        Ok(())
    }

    fn warn(&mut self, message: &str) -> anyhow::Result<()> {
        self.warnings.push(message.to_string());
        Ok(())
    }

    fn begin_group(&mut self, title: &str) -> anyhow::Result<()> {
        self.groups.push(title.to_string());
        self.open_groups += 1;
        Ok(())
    }

    fn end_group(&mut self) -> anyhow::Result<()> {
        self.open_groups = self
            .open_groups
            .checked_sub(1)
            .ok_or_else(|| anyhow::anyhow!("end_group without a matching begin_group"))?;
        Ok(())
    }

    fn fail(&mut self, message: &str) -> anyhow::Result<()> {
        self.failures.push(message.to_string());
        Ok(())
    }
}
