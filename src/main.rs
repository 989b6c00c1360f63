use anyhow::Result;
use clap::builder::FalseyValueParser;
use clap::{ArgAction, Parser, ValueEnum};
use git_status_check::artifacts::check::alert::AlertSink;
use git_status_check::artifacts::check::render::RenderMode;
use git_status_check::artifacts::check::sinks::{AlertLevel, ConsoleSink, WorkflowCommandSink};
use git_status_check::artifacts::diff::hunk::DEFAULT_CONTEXT;
use git_status_check::backend::BackendKind;
use git_status_check::commands::check::{self, CheckOptions};
use is_terminal::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    /// GitHub workflow commands inside Actions, console output elsewhere
    #[default]
    Auto,
    Github,
    Console,
}

impl OutputFormat {
    fn resolve(self) -> OutputFormat {
        match self {
            OutputFormat::Auto if std::env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true") => {
                OutputFormat::Github
            }
            OutputFormat::Auto => OutputFormat::Console,
            other => other,
        }
    }
}

#[derive(Parser)]
#[command(
    name = "git-status-check",
    version,
    author = "Sami Barbut-Dica",
    about = "Fail when the working tree has unexpected changes",
    long_about = "Compares the working tree against a commit and reports every added, deleted \
    or modified file that is not covered by the allowed changes. \
    Every option can also be set through the matching GitHub Actions input.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[arg(long, env = "GITHUB_SHA", default_value = "HEAD", help = "The commit to compare against")]
    sha: String,

    #[arg(long, env = "INPUT_DIR", default_value = ".", help = "The directory to check")]
    dir: PathBuf,

    #[arg(
        long,
        env = "GITHUB_WORKSPACE",
        hide = true,
        help = "Base directory a relative --dir is resolved against"
    )]
    workspace: Option<PathBuf>,

    #[arg(
        long = "allowed-changes",
        env = "INPUT_ALLOWED-CHANGES",
        help = "Glob patterns of permitted changes, one per line or repeated"
    )]
    allowed_changes: Vec<String>,

    #[arg(
        long = "ignore-new-files",
        env = "INPUT_IGNORE-NEW-FILES",
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new(),
        help = "Do not report files missing from the commit"
    )]
    ignore_new_files: bool,

    #[arg(
        long = "continue-with-unexpected-changes",
        env = "INPUT_CONTINUE-WITH-UNEXPECTED-CHANGES",
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new(),
        help = "Report unexpected changes as warnings and succeed"
    )]
    continue_with_unexpected_changes: bool,

    #[arg(long, env = "INPUT_RENDER", value_enum, default_value_t = RenderMode::Patch)]
    render: RenderMode,

    #[arg(
        long,
        env = "INPUT_CONTEXT",
        default_value_t = DEFAULT_CONTEXT,
        help = "Lines of context around each change"
    )]
    context: usize,

    #[arg(long, env = "INPUT_BACKEND", value_enum, default_value_t = BackendKind::Native)]
    backend: BackendKind,

    #[arg(long, value_enum, default_value_t = OutputFormat::Auto)]
    format: OutputFormat,

    #[arg(short, long, help = "Enable debug logging")]
    verbose: bool,
}

impl Cli {
    fn check_options(&self) -> CheckOptions {
        let directory = match &self.workspace {
            Some(workspace) => workspace.join(&self.dir),
            None => self.dir.clone(),
        };

        let mut options = CheckOptions::new(
            self.sha.clone(),
            directory,
            check::split_multiline(&self.allowed_changes),
            self.ignore_new_files,
        );
        options.continue_with_unexpected_changes = self.continue_with_unexpected_changes;
        options.render_mode = self.render;
        options.context = self.context;
        options.backend = self.backend;

        options
    }

    fn sink(&self) -> Box<dyn AlertSink> {
        let level = AlertLevel::from_continue_flag(self.continue_with_unexpected_changes);
        let stdout = std::io::stdout();

        match self.format.resolve() {
            OutputFormat::Github => Box::new(WorkflowCommandSink::new(stdout, level)),
            _ => {
                let color = stdout.is_terminal();
                Box::new(ConsoleSink::new(stdout, level, color))
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let options = cli.check_options();
    let mut sink = cli.sink();

    let outcome = match check::run(&options, &mut sink).await {
        Ok(outcome) => outcome,
        Err(err) => {
            let err = anyhow::Error::from(err);
            tracing::error!("{err:#}");
            sink.fail(&format!("{err:#}"))?;
            return Ok(ExitCode::FAILURE);
        }
    };

    let count = outcome.unexpected_changes;
    tracing::info!(count, "{}={count}", check::COUNT_OUTPUT_NAME);
    if let Some(output_file) = std::env::var_os("GITHUB_OUTPUT").filter(|v| !v.is_empty()) {
        check::write_count_output(&PathBuf::from(output_file), count)?;
    }

    match check::conclude(&outcome, options.continue_with_unexpected_changes, &mut sink)? {
        true => Ok(ExitCode::FAILURE),
        false => Ok(ExitCode::SUCCESS),
    }
}
