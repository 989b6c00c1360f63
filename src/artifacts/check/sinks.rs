//! Alert sinks writing to a stream
//!
//! ## GitHub Actions
//!
//! Workflow commands are single lines on stdout:
//!
//! ```text
//! ::error file=a.txt,title=Unexpected file modified::File modified:%0A@@ -1 +1 @@%0A...
//! ::group::a.txt --- file modified
//! ::endgroup::
//! ```
//!
//! Command data escapes `%`, `\r` and `\n`; property values also escape `:` and `,`.

use crate::artifacts::check::alert::{AlertPayload, AlertSink};
use colored::Colorize;
use std::io::Write;

/// Severity of emitted alerts
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum AlertLevel {
    #[default]
    Error,
    /// Used when the run continues despite unexpected changes
    Warning,
}

impl AlertLevel {
    pub fn from_continue_flag(continue_with_unexpected_changes: bool) -> Self {
        match continue_with_unexpected_changes {
            true => AlertLevel::Warning,
            false => AlertLevel::Error,
        }
    }

    fn command(&self) -> &'static str {
        match self {
            AlertLevel::Error => "error",
            AlertLevel::Warning => "warning",
        }
    }
}

pub fn escape_data(data: &str) -> String {
    data.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

pub fn escape_property(value: &str) -> String {
    escape_data(value).replace(':', "%3A").replace(',', "%2C")
}

pub struct WorkflowCommandSink<W: Write> {
    writer: W,
    level: AlertLevel,
}

impl<W: Write> WorkflowCommandSink<W> {
    pub fn new(writer: W, level: AlertLevel) -> Self {
        Self { writer, level }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn command(&mut self, name: &str, properties: &[(&str, String)], data: &str) -> anyhow::Result<()> {
        let properties = properties
            .iter()
            .map(|(key, value)| format!("{key}={}", escape_property(value)))
            .collect::<Vec<_>>()
            .join(",");
        let separator = if properties.is_empty() { "" } else { " " };

        writeln!(
            self.writer,
            "::{name}{separator}{properties}::{}",
            escape_data(data)
        )?;
        self.writer.flush()?;

        Ok(())
    }
}

impl<W: Write> AlertSink for WorkflowCommandSink<W> {
    fn emit(&mut self, payload: &AlertPayload) -> anyhow::Result<()> {
        let props = &payload.properties;
        let mut properties = vec![("file", props.file.clone()), ("title", props.title.clone())];
        if let Some(line) = props.start_line {
            properties.push(("line", line.to_string()));
        }
        if let Some(end_line) = props.end_line {
            properties.push(("endLine", end_line.to_string()));
        }

        self.command(self.level.command(), &properties, &payload.message)
    }

    fn warn(&mut self, message: &str) -> anyhow::Result<()> {
        self.command("warning", &[], message)
    }

    fn begin_group(&mut self, title: &str) -> anyhow::Result<()> {
        self.command("group", &[], title)
    }

    fn end_group(&mut self) -> anyhow::Result<()> {
        self.command("endgroup", &[], "")
    }

    fn fail(&mut self, message: &str) -> anyhow::Result<()> {
        self.command("error", &[], message)
    }
}

/// Human-readable sink for local runs
pub struct ConsoleSink<W: Write> {
    writer: W,
    level: AlertLevel,
    color: bool,
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(writer: W, level: AlertLevel, color: bool) -> Self {
        Self {
            writer,
            level,
            color,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn paint(&self, text: &str, style: impl Fn(&str) -> colored::ColoredString) -> String {
        match self.color {
            true => style(text).to_string(),
            false => text.to_string(),
        }
    }

    fn message_line(&self, line: &str) -> String {
        if line.starts_with("@@") {
            self.paint(line, |l| l.cyan())
        } else if line.starts_with('+') {
            self.paint(line, |l| l.green())
        } else if line.starts_with('-') {
            self.paint(line, |l| l.red())
        } else {
            line.to_string()
        }
    }
}

impl<W: Write> AlertSink for ConsoleSink<W> {
    fn emit(&mut self, payload: &AlertPayload) -> anyhow::Result<()> {
        let label = match self.level {
            AlertLevel::Error => self.paint("error", |l| l.red().bold()),
            AlertLevel::Warning => self.paint("warning", |l| l.yellow().bold()),
        };
        let heading = self.paint(&payload.to_string(), |l| l.bold());
        writeln!(self.writer, "{label}: {heading}")?;

        for line in payload.message.lines() {
            let line = self.message_line(line);
            writeln!(self.writer, "    {line}")?;
        }
        self.writer.flush()?;

        Ok(())
    }

    fn warn(&mut self, message: &str) -> anyhow::Result<()> {
        let label = self.paint("warning", |l| l.yellow().bold());
        writeln!(self.writer, "{label}: {message}")?;
        Ok(())
    }

    fn begin_group(&mut self, title: &str) -> anyhow::Result<()> {
        let title = self.paint(title, |l| l.bold());
        writeln!(self.writer, "{title}")?;
        Ok(())
    }

    fn end_group(&mut self) -> anyhow::Result<()> {
        writeln!(self.writer)?;
        Ok(())
    }

    fn fail(&mut self, message: &str) -> anyhow::Result<()> {
        let label = self.paint("error", |l| l.red().bold());
        writeln!(self.writer, "{label}: {message}")?;
        self.writer.flush()?;
        Ok(())
    }
}
