//! Configuration loading from treebench.toml
//!
//! Treebench configuration can be specified in a `treebench.toml` file in the project root.
//! The configuration is automatically discovered by walking up from the current directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use treebench_stats::{DEFAULT_CONFIDENCE_LEVEL, DEFAULT_ROUND_DIGITS, TimeUnit};

/// File name looked up by [`TreeConfig::discover`]
pub const CONFIG_FILE_NAME: &str = "treebench.toml";

/// Treebench configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TreeConfig {
    /// Sampling configuration
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Statistics and presentation
    #[serde(default)]
    pub stats: StatsSection,
    /// Programs under test
    #[serde(default)]
    pub program: ProgramConfig,
    /// Test input discovery
    #[serde(default)]
    pub resources: ResourcesConfig,
    /// Exit-code policy
    #[serde(default)]
    pub report: ReportConfig,
    /// Build steps run before discovery
    #[serde(default)]
    pub build: Vec<BuildStep>,
}

/// Runner configuration for sampling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Wall-clock budget per test input (e.g., "5s", "500ms")
    #[serde(default = "default_time_budget")]
    pub time_budget: String,
    /// Minimum number of measured runs
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,
    /// Maximum number of measured runs
    #[serde(default)]
    pub max_samples: Option<usize>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            time_budget: default_time_budget(),
            min_samples: default_min_samples(),
            max_samples: None,
        }
    }
}

fn default_time_budget() -> String {
    "5s".to_string()
}
fn default_min_samples() -> usize {
    5
}

/// Statistics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSection {
    /// Confidence level (e.g., 0.95 for 95%)
    #[serde(default = "default_confidence_level")]
    pub confidence_level: f64,
    /// Decimal places shown for mean and half-width
    #[serde(default = "default_round_digits")]
    pub round_digits: usize,
    /// Unit used for display: "seconds", "milliseconds" or "microseconds"
    #[serde(default)]
    pub time_unit: TimeUnit,
}

impl Default for StatsSection {
    fn default() -> Self {
        Self {
            confidence_level: default_confidence_level(),
            round_digits: default_round_digits(),
            time_unit: TimeUnit::default(),
        }
    }
}

fn default_confidence_level() -> f64 {
    DEFAULT_CONFIDENCE_LEVEL
}
fn default_round_digits() -> usize {
    DEFAULT_ROUND_DIGITS
}

/// Program configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramConfig {
    /// Executable under test
    #[serde(default = "default_executable")]
    pub executable: PathBuf,
    /// Fixed arguments placed before the test input
    #[serde(default)]
    pub args: Vec<String>,
    /// Executable timed instead of `executable` (same arguments)
    #[serde(default)]
    pub timing_executable: Option<PathBuf>,
    /// Reference implementation; enables differential mode
    #[serde(default)]
    pub reference: Option<PathBuf>,
    /// Fixed arguments for the reference
    #[serde(default)]
    pub reference_args: Vec<String>,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            args: Vec::new(),
            timing_executable: None,
            reference: None,
            reference_args: Vec::new(),
        }
    }
}

fn default_executable() -> PathBuf {
    PathBuf::from("./a.out")
}

/// Resources configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcesConfig {
    /// Root directory holding the test inputs
    #[serde(default = "default_root")]
    pub root: PathBuf,
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from("test/integration/resources")
}

/// Report configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Exit non-zero when any differential comparison fails
    #[serde(default)]
    pub fail_on_mismatch: bool,
}

/// One build step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStep {
    /// Program and arguments, run without a shell
    pub command: Vec<String>,
    /// File the command produces
    #[serde(default)]
    pub artifact: Option<PathBuf>,
    /// Where to move the artifact; it stays in place when absent
    #[serde(default)]
    pub install_as: Option<PathBuf>,
}

impl TreeConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => Some(config),
                    Err(e) => {
                        tracing::warn!("ignoring {}: {}", config_path.display(), e);
                        None
                    }
                };
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# Treebench Configuration

[runner]
# Wall-clock budget per test input
time_budget = "5s"
# Minimum measured runs per input
min_samples = 5
# Maximum measured runs per input (uncomment to enable)
# max_samples = 1000

[stats]
# Confidence level (0.0 to 1.0)
confidence_level = 0.95
# Decimal places in the report
round_digits = 3
# Display unit: seconds, milliseconds or microseconds
time_unit = "seconds"

[program]
# Executable under test; the test input is passed as the last argument
executable = "./a.out"
# Fixed arguments before the test input
args = []
# Timed instead of `executable` when set (uncomment to enable)
# timing_executable = "./a.dry-run.out"
# Reference implementation for differential mode (uncomment to enable)
# reference = "clisp"
# reference_args = []

[resources]
# Root directory of test inputs
root = "test/integration/resources"

[report]
# Exit non-zero when an output comparison fails
fail_on_mismatch = false

# Build steps run before discovery (uncomment to enable)
# [[build]]
# command = ["./compile.sh", "dry-run"]
# artifact = "a.out"
# install_as = "./a.dry-run.out"
"#
        .to_string()
    }

    /// Parse duration string (e.g., "5s", "500ms", "2m")
    pub fn parse_duration(s: &str) -> anyhow::Result<Duration> {
        let s = s.trim();
        if s.is_empty() {
            return Err(anyhow::anyhow!("Empty duration string"));
        }

        // Find where the number ends and unit begins
        let (num_part, unit_part) = s
            .char_indices()
            .find(|(_, c)| c.is_alphabetic())
            .map(|(i, _)| s.split_at(i))
            .unwrap_or((s, "s"));

        let value: f64 = num_part
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid duration number: {}", num_part))?;
        if !value.is_finite() || value < 0.0 {
            return Err(anyhow::anyhow!("Invalid duration number: {}", num_part));
        }

        let multiplier: u64 = match unit_part.to_lowercase().as_str() {
            "ns" => 1,
            "us" | "µs" => 1_000,
            "ms" => 1_000_000,
            "s" | "" => 1_000_000_000,
            "m" | "min" => 60_000_000_000,
            _ => return Err(anyhow::anyhow!("Unknown duration unit: {}", unit_part)),
        };

        Ok(Duration::from_nanos((value * multiplier as f64).round() as u64))
    }
}
