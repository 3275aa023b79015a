//! Summary Statistics
//!
//! Reduces a sample set to a mean and the half-width of a two-sided
//! Student's t confidence interval for that mean:
//! - Standard error = sample stddev (n - 1 denominator) / sqrt(n)
//! - Degrees of freedom = n - 1
//!
//! All samples are used. Nothing is trimmed or reordered.

use crate::student_t::two_sided_critical_value;
use crate::{DEFAULT_CONFIDENCE_LEVEL, DEFAULT_ROUND_DIGITS, TimeUnit};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Summarizer configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Confidence level (default: 0.95 for 95% CI)
    pub confidence_level: f64,
    /// Decimal digits shown after scaling to `time_unit`
    pub round_digits: usize,
    /// Unit used for display
    pub time_unit: TimeUnit,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            round_digits: DEFAULT_ROUND_DIGITS,
            time_unit: TimeUnit::default(),
        }
    }
}

/// Errors that can occur while summarizing
#[derive(Debug, Error, PartialEq)]
pub enum StatsError {
    /// Fewer samples than an interval needs
    #[error("Not enough samples: got {got}, need at least {min}")]
    NotEnoughSamples {
        /// Samples provided
        got: usize,
        /// Samples required
        min: usize,
    },

    /// Confidence level outside (0, 1)
    #[error("Invalid confidence level: {0} (must be between 0 and 1)")]
    InvalidConfidenceLevel(f64),

    /// A sample is NaN, infinite or negative
    #[error("Sample {index} is not a finite non-negative duration: {value}")]
    InvalidSample {
        /// Position in the sample set
        index: usize,
        /// Offending value
        value: f64,
    },
}

/// Mean and confidence interval half-width of a sample set, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Arithmetic mean
    pub mean: f64,
    /// Half-width of the two-sided confidence interval
    pub half_width: f64,
    /// Sample standard deviation
    pub std_dev: f64,
    /// Number of samples
    pub sample_count: usize,
    /// Confidence level the half-width was computed at
    pub confidence_level: f64,
}

/// Compute the mean and confidence interval half-width of `samples` (seconds)
pub fn summarize(samples: &[f64], confidence_level: f64) -> Result<Summary, StatsError> {
    if samples.len() < 2 {
        return Err(StatsError::NotEnoughSamples {
            got: samples.len(),
            min: 2,
        });
    }

    if !(confidence_level > 0.0 && confidence_level < 1.0) {
        return Err(StatsError::InvalidConfidenceLevel(confidence_level));
    }

    if let Some((index, &value)) = samples
        .iter()
        .enumerate()
        .find(|(_, v)| !v.is_finite() || **v < 0.0)
    {
        return Err(StatsError::InvalidSample { index, value });
    }

    let n = samples.len();
    let mean = samples.iter().sum::<f64>() / n as f64;
    let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let std_dev = variance.sqrt();

    Ok(Summary {
        mean,
        half_width: half_width(std_dev, n, confidence_level),
        std_dev,
        sample_count: n,
        confidence_level,
    })
}

/// Half-width of the mean's confidence interval for a given stddev and sample count
///
/// Returns NaN when `sample_count < 2`.
pub fn half_width(std_dev: f64, sample_count: usize, confidence_level: f64) -> f64 {
    if sample_count < 2 {
        return f64::NAN;
    }
    let n = sample_count as f64;
    let standard_error = std_dev / n.sqrt();
    two_sided_critical_value(confidence_level, n - 1.0) * standard_error
}

impl Summary {
    /// Lower bound of the confidence interval
    pub fn lower(&self) -> f64 {
        self.mean - self.half_width
    }

    /// Upper bound of the confidence interval
    pub fn upper(&self) -> f64 {
        self.mean + self.half_width
    }

    /// Render as `"<mean> ± <half-width> <unit> (n=<count>)"`.
    ///
    /// Values are scaled to `unit` and rounded to `digits` decimals for display only.
    pub fn display(&self, unit: TimeUnit, digits: usize) -> String {
        format!(
            "{:.*} \u{00B1} {:.*} {} (n={})",
            digits,
            unit.scale(self.mean),
            digits,
            unit.scale(self.half_width),
            unit.label(),
            self.sample_count
        )
    }
}
