#![warn(missing_docs)]
//! TreeBench Statistical Engine
//!
//! Small-sample statistics for process timing results:
//! - Student's t distribution (CDF and quantile)
//! - Mean with a two-sided t confidence interval (df = n - 1)
//! - Presentation-only scaling and rounding to a display unit

mod student_t;
mod summary;

use serde::{Deserialize, Serialize};

pub use student_t::{t_cdf, t_quantile, two_sided_critical_value};
pub use summary::{StatsConfig, StatsError, Summary, half_width, summarize};

/// Default confidence level (95%)
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// Default number of decimals shown in reports
pub const DEFAULT_ROUND_DIGITS: usize = 3;

/// Unit used when displaying durations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    /// Seconds (no scaling)
    #[default]
    Seconds,
    /// Milliseconds (x1000)
    Milliseconds,
    /// Microseconds (x1000000)
    Microseconds,
}

impl TimeUnit {
    /// Multiplier applied to a value in seconds
    pub fn multiplier(self) -> f64 {
        match self {
            TimeUnit::Seconds => 1.0,
            TimeUnit::Milliseconds => 1_000.0,
            TimeUnit::Microseconds => 1_000_000.0,
        }
    }

    /// Convert a value in seconds to this unit
    pub fn scale(self, seconds: f64) -> f64 {
        seconds * self.multiplier()
    }

    /// Word printed after the value
    pub fn label(self) -> &'static str {
        match self {
            TimeUnit::Seconds => "seconds",
            TimeUnit::Milliseconds => "milliseconds",
            TimeUnit::Microseconds => "microseconds",
        }
    }
}

impl std::str::FromStr for TimeUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "s" | "sec" | "seconds" => Ok(TimeUnit::Seconds),
            "ms" | "milliseconds" => Ok(TimeUnit::Milliseconds),
            "us" | "µs" | "microseconds" => Ok(TimeUnit::Microseconds),
            other => Err(format!("Unknown time unit: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert!((DEFAULT_CONFIDENCE_LEVEL - 0.95).abs() < f64::EPSILON);
        assert_eq!(DEFAULT_ROUND_DIGITS, 3);
    }

    #[test]
    fn test_time_unit_scale() {
        assert_eq!(TimeUnit::Seconds.scale(1.5), 1.5);
        assert_eq!(TimeUnit::Milliseconds.scale(0.25), 250.0);
        assert_eq!(TimeUnit::Microseconds.scale(0.5), 500_000.0);
    }

    #[test]
    fn test_time_unit_parse() {
        assert_eq!("ms".parse::<TimeUnit>(), Ok(TimeUnit::Milliseconds));
        assert_eq!("Seconds".parse::<TimeUnit>(), Ok(TimeUnit::Seconds));
        assert_eq!("us".parse::<TimeUnit>(), Ok(TimeUnit::Microseconds));
        assert!("fortnights".parse::<TimeUnit>().is_err());
    }
}
