//! agentlint: configuration checks for agent descriptors and hook registries
//!
//! Validates the files an agent host reads at startup, before the host does:
//!
//! - **Descriptors** (`agents/*.md`): a `---` delimited header block with
//!   `name`, `description`, `tools` and optional `model`/`skills`, followed
//!   by a prose body.
//! - **Manifest** (`.claude-plugin/plugin.json`): the declared list of
//!   descriptor files, cross-checked against what is on disk.
//! - **Hook settings** (`~/.claude/settings.json`, `.claude/settings.json`):
//!   lifecycle events mapped to matcher entries and command actions.
//!
//! Every problem becomes a [`Diagnostic`](core::diagnostic::Diagnostic).
//! Nothing is written to disk. The process exits non-zero when any error is
//! found; warnings alone pass.
//!
//! # Examples
//!
//! ```bash
//! # Descriptors plus manifest cross-check
//! agentlint agents
//!
//! # Only the project hook settings, as JSON for CI
//! agentlint --format json hooks --project
//!
//! # Everything
//! agentlint all
//! ```
//!
//! # Crate Structure
//!
//! - [`core`]: diagnostics, config, header parsing, command and path
//!   resolution, report rendering
//! - [`plugins`]: the descriptor, manifest and hook validators

pub mod core;
pub mod plugins;

use crate::core::config::{self, Config};
use crate::core::diagnostic::Outcome;
use crate::core::error::AgentlintError;
use crate::core::paths::PathResolver;
use crate::core::report::{Report, Section};
use crate::plugins::agents::{self, AgentsOptions, AgentsRun};
use crate::plugins::hooks::{self, HookSelection, HooksRun};

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[clap(
    name = "agentlint",
    version = env!("CARGO_PKG_VERSION"),
    about = "Validate agent descriptors, plugin manifests and hook settings"
)]
struct Cli {
    /// Project root; relative paths resolve against it (defaults to the current directory).
    #[clap(long, global = true)]
    root: Option<PathBuf>,
    /// Config file (defaults to `<root>/agentlint.toml` when present).
    #[clap(long, global = true)]
    config: Option<PathBuf>,
    /// Output format.
    #[clap(long, value_enum, default_value = "text", global = true)]
    format: Format,
    /// Include informational notes in text output.
    #[clap(short, long, global = true)]
    verbose: bool,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(clap::Args, Debug)]
struct AgentsCli {
    /// Descriptor directory, relative to the root.
    #[clap(long)]
    dir: Option<PathBuf>,
    /// Manifest document, relative to the root.
    #[clap(long)]
    manifest: Option<PathBuf>,
    /// Skip the manifest cross-check.
    #[clap(long, conflicts_with = "manifest")]
    no_manifest: bool,
}

#[derive(clap::Args, Debug)]
struct HooksCli {
    /// Check the user-level settings file.
    #[clap(long)]
    global: bool,
    /// Check the project settings file.
    #[clap(long)]
    project: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate descriptor headers and cross-check the manifest.
    Agents(AgentsCli),
    /// Validate hook settings (both sources unless one is selected).
    Hooks(HooksCli),
    /// Run every check.
    All,
    /// Print the effective configuration.
    Config,
}

fn agents_report(report: &mut Report, run: AgentsRun) {
    report.descriptors += run.documents;
    report.push(Section::new(agents::SOURCE, Some(run.dir), run.outcome));
    if let Some(manifest) = run.manifest {
        report.push(Section::new(
            plugins::manifest::SOURCE,
            Some(manifest.path),
            manifest.outcome,
        ));
    }
}

fn hooks_report(report: &mut Report, run: HooksRun) {
    report.hook_entries += run.hooks();
    for source in run.sources {
        let section = Section::new(format!("hooks: {}", source.label), source.path, source.outcome);
        report.push(if source.loaded { section } else { section.skipped() });
    }
}

fn emit(report: &Report, format: Format, verbose: bool) -> Result<(), AgentlintError> {
    match format {
        Format::Text => print!("{}", report.render(verbose)),
        Format::Json => println!("{}", report.to_json()?),
    }

    let outcome: Outcome = report.outcome();
    if outcome.has_errors() {
        for line in report.error_lines() {
            eprintln!("{}", line);
        }
        return Err(AgentlintError::ValidationError(format!(
            "{} error(s), {} warning(s).",
            outcome.error_count(),
            outcome.warning_count()
        )));
    }
    Ok(())
}

fn resolve_root(root: Option<PathBuf>) -> Result<PathBuf, AgentlintError> {
    let root = match root {
        Some(r) => r,
        None => std::env::current_dir()?,
    };
    root.canonicalize()
        .map_err(|e| AgentlintError::PathError(format!("{}: {}", root.display(), e)))
}

fn run_all(
    root: &Path,
    config: &Config,
    descriptors: Option<AgentsOptions>,
    settings: Option<HookSelection>,
) -> Result<Report, AgentlintError> {
    let mut report = Report::new();
    if let Some(options) = descriptors {
        agents_report(&mut report, agents::run_agents(root, config, &options)?);
    }
    if let Some(selection) = settings {
        let resolver = PathResolver::from_env(root);
        hooks_report(&mut report, hooks::run_hooks(config, &resolver, selection));
    }
    Ok(report)
}

pub fn run() -> Result<(), AgentlintError> {
    let cli = Cli::parse();
    let root = resolve_root(cli.root)?;
    let config = config::load_config(&root, cli.config.as_deref())?;
    tracing::debug!("root {}", root.display());

    let (descriptors, settings) = match cli.command {
        Command::Config => {
            print!("{}", config::render_config(&config)?);
            return Ok(());
        }
        Command::Agents(a) => (
            Some(AgentsOptions {
                dir: a.dir,
                manifest: a.manifest,
                skip_manifest: a.no_manifest,
            }),
            None,
        ),
        Command::Hooks(h) => (
            None,
            Some(HookSelection {
                global: h.global,
                project: h.project,
            }),
        ),
        Command::All => (Some(AgentsOptions::default()), Some(HookSelection::default())),
    };

    let report = run_all(&root, &config, descriptors, settings)?;
    emit(&report, cli.format, cli.verbose)
}
