#![warn(missing_docs)]
//! # Treebench
//!
//! Timing and differential-correctness harness over a directory tree of test inputs.
//!
//! Treebench runs an executable once per test file and prints an outline that
//! mirrors the directory layout:
//! - **Adaptive Sampling**: one calibration run sizes the repetition count to a time budget
//! - **Statistical Summary**: mean with a Student's t confidence interval (df = n - 1)
//! - **Differential Testing**: byte-exact stdout comparison against a reference implementation
//! - **Outline Report**: depth-first, directory-shaped output with colour or plain tags
//! - **Build Steps**: compile the executable first and clean it up afterwards
//!
//! ## Quick Start
//!
//! ```text
//! $ treebench init > treebench.toml
//! $ treebench --program ./a.out --reference clisp --unit ms
//! resources
//!   └ arith
//!     └ add.lisp 1.2 ± 0.1 milliseconds (n=41)
//! ```
//!
//! ## Library Use
//!
//! ```ignore
//! use treebench::{TestTree, HarnessRunner, PlainStyle, TreeReporter};
//!
//! let tree = TestTree::discover(root)?;
//! let mut reporter = TreeReporter::new(std::io::stdout(), &PlainStyle, Default::default());
//! reporter.report("resources", &tree, &mut runner)?;
//! ```

// Re-export core types
pub use treebench_core::{
    AdaptiveSampler, BoundCommand, CapturedOutput, CommandError, CompareError,
    DifferentialComparator, DirListing, ProgramCommand, RESERVED_NAME, SampleError, SampleSet,
    SamplerConfig, TestTree, TreeError, Verdict, Workload, leaf_name, walk_resources,
};

// Re-export stats
pub use treebench_stats::{
    StatsConfig, StatsError, Summary, TimeUnit, summarize, t_quantile,
    two_sided_critical_value,
};

// Re-export CLI building blocks
pub use treebench_cli::{
    AnsiStyle, ArtifactGuard, BuildStep, Cli, ColorChoice, ExecutionConfig, HarnessRunner,
    LeafOutcome, LeafRunner, LeafStatus, ListRunner, PlainStyle, RunTally, Settings, Style,
    TreeConfig, TreeReporter, list_tests, run_tests,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        DifferentialComparator, HarnessRunner, PlainStyle, ProgramCommand, StatsConfig, TestTree,
        TreeReporter,
    };
}

/// Run the Treebench CLI.
///
/// Call this from a binary's `main()`:
/// ```ignore
/// fn main() -> anyhow::Result<()> {
///     treebench::run()
/// }
/// ```
pub use treebench_cli::run;
