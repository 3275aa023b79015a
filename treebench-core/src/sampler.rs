//! Adaptive Sampling
//!
//! Chooses how many timed repetitions to run from a single calibration run:
//!
//! ```text
//! calibration (t0, discarded) → n = max(⌊B / t0⌋ - 1, min) → n timed runs
//! ```
//!
//! The calibration run doubles as cache warm-up, so the first measured run is
//! not penalized by cold page cache or dynamic loader work. The sample count is
//! fixed before measurement starts and every run is kept, in execution order.

use crate::command::{BoundCommand, CommandError};
use std::time::Duration;
use thiserror::Error;

/// Default time budget per test input
pub const DEFAULT_TIME_BUDGET: Duration = Duration::from_secs(5);

/// Minimum samples required for a meaningful confidence interval
pub const DEFAULT_MIN_SAMPLES: usize = 5;

/// Something that can be run repeatedly and timed
pub trait Workload {
    /// Run once, returning the elapsed wall-clock time
    fn run_once(&mut self) -> Result<Duration, CommandError>;
}

impl Workload for BoundCommand<'_> {
    fn run_once(&mut self) -> Result<Duration, CommandError> {
        self.run_timed()
    }
}

/// Errors that stop sampling for one test input
#[derive(Debug, Error)]
pub enum SampleError {
    /// Calibration run measured as zero duration
    #[error("calibration run took zero time; cannot derive a repetition count")]
    ZeroCalibration,

    /// A run could not be launched
    #[error(transparent)]
    Spawn(#[from] CommandError),
}

/// Sampler configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerConfig {
    /// Rough wall-clock budget for all measured runs of one input
    pub time_budget: Duration,
    /// Lower bound on the number of measured runs
    pub min_samples: usize,
    /// Optional upper bound on the number of measured runs (never below `min_samples`)
    pub max_samples: Option<usize>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            time_budget: DEFAULT_TIME_BUDGET,
            min_samples: DEFAULT_MIN_SAMPLES,
            max_samples: None,
        }
    }
}

impl SamplerConfig {
    /// Number of measured runs for a given calibration time.
    ///
    /// `n = max(⌊budget / calibration⌋ - 1, min_samples)`, then clamped by `max_samples`.
    pub fn repetition_count(&self, calibration: Duration) -> Result<usize, SampleError> {
        if calibration.is_zero() {
            return Err(SampleError::ZeroCalibration);
        }

        let fits = (self.time_budget.as_secs_f64() / calibration.as_secs_f64()).floor();
        // `as` saturates, so an absurdly fast calibration cannot wrap
        let mut count = (fits as usize).saturating_sub(1).max(self.min_samples);

        if let Some(max) = self.max_samples {
            count = count.min(max.max(self.min_samples));
        }

        Ok(count)
    }
}

/// Durations (seconds) collected for one test input
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSet {
    calibration: Duration,
    samples: Vec<f64>,
}

impl SampleSet {
    /// Calibration run duration (not part of the samples)
    pub fn calibration(&self) -> Duration {
        self.calibration
    }

    /// Measured durations in seconds, in execution order
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Number of measured runs
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false for a completed collection
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Take ownership of the durations
    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }
}

/// Runs the calibrate-then-measure protocol
#[derive(Debug, Clone, Copy, Default)]
pub struct AdaptiveSampler {
    config: SamplerConfig,
}

impl AdaptiveSampler {
    /// Create a sampler
    pub fn new(config: SamplerConfig) -> Self {
        Self { config }
    }

    /// Sampler configuration
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Collect samples for one workload
    pub fn collect<W: Workload>(&self, workload: &mut W) -> Result<SampleSet, SampleError> {
        self.collect_with_progress(workload, |_, _| {})
    }

    /// Collect samples, calling `on_sample(done, total)` after every measured run
    pub fn collect_with_progress<W, P>(
        &self,
        workload: &mut W,
        mut on_sample: P,
    ) -> Result<SampleSet, SampleError>
    where
        W: Workload,
        P: FnMut(usize, usize),
    {
        let calibration = workload.run_once()?;
        let count = self.config.repetition_count(calibration)?;

        tracing::debug!(
            calibration_ms = calibration.as_secs_f64() * 1000.0,
            count,
            "calibrated"
        );

        let mut samples = Vec::with_capacity(count);
        for done in 1..=count {
            let elapsed = workload.run_once()?;
            samples.push(elapsed.as_secs_f64());
            on_sample(done, count);
        }

        Ok(SampleSet {
            calibration,
            samples,
        })
    }
}
