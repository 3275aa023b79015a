#![warn(missing_docs)]
//! Treebench CLI Library
//!
//! This module provides the command-line front end: argument parsing,
//! `treebench.toml` discovery, build steps, and the outline run itself.
//! Use `treebench::run()` (or `treebench_cli::run()`) in a main function.
//!
//! # Example
//!
//! ```ignore
//! fn main() -> anyhow::Result<()> {
//!     treebench_cli::run()
//! }
//! ```

mod build_steps;
mod config;
mod executor;
mod planner;

pub use build_steps::{ArtifactGuard, BuildError, run_build_steps};
pub use config::*;
pub use executor::{
    AnsiStyle, BRANCH, ColorChoice, ExecutionConfig, HarnessRunner, INDENT, LeafError,
    LeafOutcome, LeafRunner, LeafStatus, ListRunner, NO_COLOR_ENV, PlainStyle, RunTally, Style,
    TreeReporter, no_color_requested, select_style,
};
pub use planner::{TestPlan, build_plan, plan_from_tree, root_label};

use anyhow::Context;
use clap::{Parser, Subcommand};
use regex::Regex;
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use treebench_core::{DifferentialComparator, ProgramCommand, SamplerConfig};
use treebench_stats::{StatsConfig, TimeUnit};

/// Treebench CLI arguments
#[derive(Parser, Debug)]
#[command(name = "treebench")]
#[command(author, version, about = "Treebench - timing and differential testing over a directory of inputs")]
pub struct Cli {
    /// Optional subcommand (Run, List, Init); defaults to Run
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Only run tests whose path below the root matches this regex
    pub filter: Option<String>,

    /// Resources root directory
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Executable under test
    #[arg(short, long)]
    pub program: Option<PathBuf>,

    /// Fixed argument for the executable (repeatable, placed before the test path)
    #[arg(long = "arg", allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Executable timed instead of --program
    #[arg(long)]
    pub timing_program: Option<PathBuf>,

    /// Reference implementation; enables PASS/FAIL output comparison
    #[arg(short, long)]
    pub reference: Option<PathBuf>,

    /// Fixed argument for the reference (repeatable)
    #[arg(long = "reference-arg", allow_hyphen_values = true)]
    pub reference_args: Vec<String>,

    /// Time budget per test input (e.g., "5s", "500ms")
    #[arg(short, long)]
    pub budget: Option<String>,

    /// Minimum number of measured runs
    #[arg(long)]
    pub min_samples: Option<usize>,

    /// Maximum number of measured runs
    #[arg(long)]
    pub max_samples: Option<usize>,

    /// Confidence level (e.g., 0.95)
    #[arg(long)]
    pub confidence: Option<f64>,

    /// Decimal places in the report
    #[arg(long)]
    pub digits: Option<usize>,

    /// Display unit: s, ms or us
    #[arg(long)]
    pub unit: Option<TimeUnit>,

    /// When to colour the outline
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Exit non-zero when any output comparison fails
    #[arg(long)]
    pub fail_on_mismatch: bool,

    /// Do not run [[build]] steps
    #[arg(long)]
    pub skip_build: bool,

    /// Configuration file (default: discover treebench.toml upward from cwd)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Run all tests (default)
    Run,
    /// Print the test tree without running anything
    List,
    /// Print a default treebench.toml
    Init,
}

/// Settings resolved from `treebench.toml` and CLI overrides
#[derive(Debug, Clone)]
pub struct Settings {
    /// Resources root
    pub root: PathBuf,
    /// Optional leaf path filter
    pub filter: Option<Regex>,
    /// Candidate command (compared)
    pub program: ProgramCommand,
    /// Command that gets timed
    pub timed: ProgramCommand,
    /// Reference command, if running differentially
    pub reference: Option<ProgramCommand>,
    /// Repetition policy
    pub sampler: SamplerConfig,
    /// Summary and display settings
    pub stats: StatsConfig,
    /// Whether FAIL verdicts affect the exit code
    pub fail_on_mismatch: bool,
    /// Build steps to run first
    pub build: Vec<BuildStep>,
}

impl Settings {
    /// Layer CLI flags over file configuration
    pub fn resolve(cli: &Cli, config: &TreeConfig) -> anyhow::Result<Self> {
        let budget = cli.budget.as_deref().unwrap_or(&config.runner.time_budget);
        let time_budget = TreeConfig::parse_duration(budget)
            .with_context(|| format!("invalid time budget `{}`", budget))?;

        let min_samples = cli.min_samples.unwrap_or(config.runner.min_samples);
        if min_samples < 2 {
            anyhow::bail!("min_samples must be at least 2 to form a confidence interval");
        }

        let confidence_level = cli.confidence.unwrap_or(config.stats.confidence_level);
        if !(confidence_level > 0.0 && confidence_level < 1.0) {
            anyhow::bail!("confidence level must be between 0 and 1, got {}", confidence_level);
        }

        let filter = cli
            .filter
            .as_deref()
            .map(Regex::new)
            .transpose()
            .context("invalid filter pattern")?;

        let program_args = if cli.args.is_empty() {
            config.program.args.clone()
        } else {
            cli.args.clone()
        };
        let executable = cli
            .program
            .clone()
            .unwrap_or_else(|| config.program.executable.clone());
        let program = ProgramCommand::new(executable).args(program_args.iter());

        let timed = match cli
            .timing_program
            .clone()
            .or_else(|| config.program.timing_executable.clone())
        {
            Some(path) => ProgramCommand::new(path).args(program_args.iter()),
            None => program.clone(),
        };

        let reference_args = if cli.reference_args.is_empty() {
            &config.program.reference_args
        } else {
            &cli.reference_args
        };
        let reference = cli
            .reference
            .clone()
            .or_else(|| config.program.reference.clone())
            .map(|path| ProgramCommand::new(path).args(reference_args.iter()));

        Ok(Self {
            root: cli.root.clone().unwrap_or_else(|| config.resources.root.clone()),
            filter,
            program,
            timed,
            reference,
            sampler: SamplerConfig {
                time_budget,
                min_samples,
                max_samples: cli.max_samples.or(config.runner.max_samples),
            },
            stats: StatsConfig {
                confidence_level,
                round_digits: cli.digits.unwrap_or(config.stats.round_digits),
                time_unit: cli.unit.unwrap_or(config.stats.time_unit),
            },
            fail_on_mismatch: cli.fail_on_mismatch || config.report.fail_on_mismatch,
            build: if cli.skip_build {
                Vec::new()
            } else {
                config.build.clone()
            },
        })
    }

    /// Leaf runner for these settings
    pub fn runner(&self, show_progress: bool) -> HarnessRunner {
        let runner = HarnessRunner::new(
            self.timed.clone(),
            ExecutionConfig {
                sampler: self.sampler,
                confidence_level: self.stats.confidence_level,
                show_progress,
            },
        );
        match &self.reference {
            Some(reference) => runner.with_comparator(DifferentialComparator::new(
                reference.clone(),
                self.program.clone(),
            )),
            None => runner,
        }
    }
}

/// Run the Treebench CLI with the process arguments.
/// This is the main entry point for the `treebench` binary.
///
/// # Returns
/// Returns `Ok(())` on success, or an error if something goes wrong.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the Treebench CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    // Initialize logging (stderr, so the outline on stdout stays clean)
    let default_filter = if cli.verbose {
        "treebench=debug"
    } else {
        "treebench=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    if cli.command == Some(Commands::Init) {
        print!("{}", TreeConfig::default_toml());
        return Ok(());
    }

    // Explicit --config must load; otherwise discover treebench.toml (CLI flags override)
    let config = match &cli.config {
        Some(path) => TreeConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => TreeConfig::discover().unwrap_or_default(),
    };
    let settings = Settings::resolve(&cli, &config)?;
    let style = select_style(cli.color);
    let stdout = std::io::stdout();

    if cli.command == Some(Commands::List) {
        list_tests(&settings, stdout.lock(), style.as_ref())?;
        return Ok(());
    }

    let show_progress = std::io::stderr().is_terminal();
    let tally = run_tests(&settings, stdout.lock(), style.as_ref(), show_progress)?;

    tracing::info!(
        "{} tests in {} directories: {} passed, {} failed, {} errored",
        tally.leaves,
        tally.directories,
        tally.passed,
        tally.failed,
        tally.errored
    );

    if !tally.is_success(settings.fail_on_mismatch) {
        std::process::exit(1);
    }

    Ok(())
}

/// Run build steps, discover tests and print the outline.
///
/// Build artifacts are removed before this returns, whatever the outcome.
pub fn run_tests<W: Write>(
    settings: &Settings,
    out: W,
    style: &dyn Style,
    show_progress: bool,
) -> anyhow::Result<RunTally> {
    let mut guard = ArtifactGuard::new();
    run_build_steps(&settings.build, &mut guard)?;

    let plan = build_plan(&settings.root, settings.filter.as_ref())
        .with_context(|| format!("failed to load tests from {}", settings.root.display()))?;
    tracing::info!(
        "running {} tests from {}",
        plan.leaf_count(),
        settings.root.display()
    );

    let mut runner = settings.runner(show_progress);
    let mut reporter = TreeReporter::new(out, style, settings.stats);
    let tally = reporter.report(&plan.root_name, &plan.tree, &mut runner)?;

    Ok(tally)
}

/// Print the test tree without building or running anything
pub fn list_tests<W: Write>(
    settings: &Settings,
    out: W,
    style: &dyn Style,
) -> anyhow::Result<RunTally> {
    let plan = build_plan(&settings.root, settings.filter.as_ref())
        .with_context(|| format!("failed to load tests from {}", settings.root.display()))?;

    let mut reporter = TreeReporter::new(out, style, settings.stats);
    let tally = reporter.report(&plan.root_name, &plan.tree, &mut ListRunner)?;
    Ok(tally)
}
