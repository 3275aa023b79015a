//! Leaf Execution
//!
//! Runs one test input through the harness and reports what happened.
//!
//! ## Data Flow
//!
//! ```text
//! test path
//!     │
//!     ▼
//! ┌──────────────────────┐
//! │ DifferentialComparator│  reference vs candidate stdout (optional)
//! └──────────┬───────────┘
//!            │
//!            ▼
//! ┌──────────────────────┐
//! │   AdaptiveSampler    │  calibration → n timed runs
//! └──────────┬───────────┘
//!            │
//!            ▼
//!        summarize
//!            │
//!            ▼
//!       LeafOutcome (verdict, Measured | Errored)
//! ```
//!
//! A launch failure in the comparator skips timing for that leaf, since the
//! same executable would fail again.

use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use treebench_core::{
    AdaptiveSampler, CompareError, DifferentialComparator, ProgramCommand, SampleError,
    SamplerConfig, leaf_name,
};
use treebench_stats::{StatsError, Summary, summarize};

/// Why a leaf could not be measured
#[derive(Debug, Error)]
pub enum LeafError {
    /// Differential comparison could not run
    #[error(transparent)]
    Compare(#[from] CompareError),

    /// Sampling failed
    #[error(transparent)]
    Sample(#[from] SampleError),

    /// Samples could not be summarized
    #[error(transparent)]
    Stats(#[from] StatsError),
}

/// Measurement result for one leaf
#[derive(Debug)]
pub enum LeafStatus {
    /// Timing summary in seconds
    Measured(Summary),
    /// Leaf could not be measured
    Errored(LeafError),
    /// Nothing was run
    Listed,
}

/// Everything the reporter needs to print one leaf
#[derive(Debug)]
pub struct LeafOutcome {
    /// `Some(passed)` when a differential comparison ran
    pub verdict: Option<bool>,
    /// Measurement result
    pub status: LeafStatus,
}

impl LeafOutcome {
    /// Outcome for a leaf that was only listed
    pub fn listed() -> Self {
        Self {
            verdict: None,
            status: LeafStatus::Listed,
        }
    }
}

/// Runs a single test input
pub trait LeafRunner {
    /// Process the test input at `path`
    fn run_leaf(&mut self, path: &Path) -> LeafOutcome;
}

/// Configuration for leaf execution
#[derive(Debug, Clone)]
pub struct ExecutionConfig {
    /// Repetition policy
    pub sampler: SamplerConfig,
    /// Confidence level for intervals
    pub confidence_level: f64,
    /// Draw a spinner on stderr while sampling
    pub show_progress: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            sampler: SamplerConfig::default(),
            confidence_level: treebench_stats::DEFAULT_CONFIDENCE_LEVEL,
            show_progress: false,
        }
    }
}

/// Compares (optionally) and times every leaf
#[derive(Debug, Clone)]
pub struct HarnessRunner {
    timed: ProgramCommand,
    comparator: Option<DifferentialComparator>,
    sampler: AdaptiveSampler,
    confidence_level: f64,
    show_progress: bool,
}

impl HarnessRunner {
    /// Create a runner timing `timed`
    pub fn new(timed: ProgramCommand, config: ExecutionConfig) -> Self {
        Self {
            timed,
            comparator: None,
            sampler: AdaptiveSampler::new(config.sampler),
            confidence_level: config.confidence_level,
            show_progress: config.show_progress,
        }
    }

    /// Compare outputs with `comparator` before timing each leaf
    pub fn with_comparator(mut self, comparator: DifferentialComparator) -> Self {
        self.comparator = Some(comparator);
        self
    }

    /// Whether leaves get a PASS/FAIL verdict
    pub fn is_differential(&self) -> bool {
        self.comparator.is_some()
    }

    fn measure(&self, path: &Path) -> Result<Summary, LeafError> {
        let name = leaf_name(path);
        let pb = self.spinner(&name);

        let mut workload = self.timed.bind(path);
        let collected = self
            .sampler
            .collect_with_progress(&mut workload, |done, total| {
                pb.set_message(format!("{} {}/{}", name, done, total));
            });
        pb.finish_and_clear();

        let set = collected?;
        let summary = summarize(set.samples(), self.confidence_level)?;
        tracing::debug!(
            test = %path.display(),
            samples = set.len(),
            mean = summary.mean,
            half_width = summary.half_width,
            "measured"
        );
        Ok(summary)
    }

    fn spinner(&self, name: &str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("{} calibrating", name));
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}

impl LeafRunner for HarnessRunner {
    fn run_leaf(&mut self, path: &Path) -> LeafOutcome {
        let verdict = match &self.comparator {
            Some(comparator) => match comparator.compare(path) {
                Ok(verdict) => Some(verdict.passed),
                Err(e) => {
                    return LeafOutcome {
                        verdict: None,
                        status: LeafStatus::Errored(e.into()),
                    };
                }
            },
            None => None,
        };

        let status = match self.measure(path) {
            Ok(summary) => LeafStatus::Measured(summary),
            Err(e) => LeafStatus::Errored(e),
        };

        LeafOutcome { verdict, status }
    }
}

/// Lists leaves without running anything
#[derive(Debug, Clone, Copy, Default)]
pub struct ListRunner;

impl LeafRunner for ListRunner {
    fn run_leaf(&mut self, _path: &Path) -> LeafOutcome {
        LeafOutcome::listed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config() -> ExecutionConfig {
        ExecutionConfig {
            sampler: SamplerConfig {
                time_budget: Duration::from_millis(1),
                min_samples: 5,
                max_samples: Some(5),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_list_runner() {
        let outcome = ListRunner.run_leaf(Path::new("a/x.test"));
        assert!(outcome.verdict.is_none());
        assert!(matches!(outcome.status, LeafStatus::Listed));
    }

    #[test]
    fn test_missing_program_errors_leaf() {
        let mut runner = HarnessRunner::new(
            ProgramCommand::new("./no-such-program-52d0"),
            quick_config(),
        );
        let outcome = runner.run_leaf(Path::new("x"));

        assert!(outcome.verdict.is_none());
        assert!(matches!(
            outcome.status,
            LeafStatus::Errored(LeafError::Sample(SampleError::Spawn(_)))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_timing_only() {
        let mut runner = HarnessRunner::new(ProgramCommand::new("true"), quick_config());
        assert!(!runner.is_differential());

        let outcome = runner.run_leaf(Path::new("ignored"));
        match outcome.status {
            LeafStatus::Measured(summary) => {
                assert_eq!(summary.sample_count, 5);
                assert!(summary.mean > 0.0);
            }
            other => panic!("expected a measurement, got {:?}", other),
        }
        assert!(outcome.verdict.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_differential_verdicts() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("hello.sh");
        std::fs::write(&input, "echo hi\n").unwrap();

        let mut same = HarnessRunner::new(ProgramCommand::new("cat"), quick_config())
            .with_comparator(DifferentialComparator::new(
                ProgramCommand::new("cat"),
                ProgramCommand::new("cat"),
            ));
        let outcome = same.run_leaf(&input);
        assert_eq!(outcome.verdict, Some(true));
        assert!(matches!(outcome.status, LeafStatus::Measured(_)));

        // A mismatch is still timed
        let mut differ = HarnessRunner::new(ProgramCommand::new("sh"), quick_config())
            .with_comparator(DifferentialComparator::new(
                ProgramCommand::new("cat"),
                ProgramCommand::new("sh"),
            ));
        let outcome = differ.run_leaf(&input);
        assert_eq!(outcome.verdict, Some(false));
        assert!(matches!(outcome.status, LeafStatus::Measured(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_comparison_runs_before_timing() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("calls.log");
        let logging = |tag: &str| {
            ProgramCommand::new("sh")
                .arg("-c")
                .arg(format!("echo {} >> '{}'", tag, log.display()))
        };

        let mut runner = HarnessRunner::new(logging("timed"), quick_config())
            .with_comparator(DifferentialComparator::new(
                logging("reference"),
                logging("candidate"),
            ));
        let outcome = runner.run_leaf(Path::new("x"));

        assert_eq!(outcome.verdict, Some(true));
        assert!(matches!(outcome.status, LeafStatus::Measured(_)));

        let calls = std::fs::read_to_string(&log).unwrap();
        let calls: Vec<&str> = calls.lines().collect();
        assert_eq!(&calls[..2], &["reference", "candidate"]);
        // One calibration run plus five measured runs
        assert_eq!(calls[2..], ["timed"; 6]);
    }

    #[cfg(unix)]
    #[test]
    fn test_verdict_kept_when_timing_fails() {
        let mut runner = HarnessRunner::new(
            ProgramCommand::new("./no-such-dry-run-52d0"),
            quick_config(),
        )
        .with_comparator(DifferentialComparator::new(
            ProgramCommand::new("true"),
            ProgramCommand::new("true"),
        ));
        let outcome = runner.run_leaf(Path::new("x"));

        assert_eq!(outcome.verdict, Some(true));
        assert!(matches!(
            outcome.status,
            LeafStatus::Errored(LeafError::Sample(SampleError::Spawn(_)))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_comparator_failure_skips_timing() {
        let mut runner = HarnessRunner::new(ProgramCommand::new("true"), quick_config())
            .with_comparator(DifferentialComparator::new(
                ProgramCommand::new("./no-such-reference-52d0"),
                ProgramCommand::new("true"),
            ));
        let outcome = runner.run_leaf(Path::new("x"));

        assert!(outcome.verdict.is_none());
        assert!(matches!(
            outcome.status,
            LeafStatus::Errored(LeafError::Compare(CompareError::Reference(_)))
        ));
    }
}
