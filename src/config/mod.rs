//! Configuration
//!
//! Mining thresholds (with YAML overrides) and the command line settings of
//! the `hamper` binary.

use std::{fs, num::NonZeroUsize, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod cli;
pub mod observability;

pub use cli::CliConfig;
pub use observability::{LogFormat, LoggingConfig};

/// Default minimum support.
pub const DEFAULT_MIN_SUPPORT: f64 = 0.01;

/// Default minimum lift.
pub const DEFAULT_MIN_LIFT: f64 = 1.0;

/// Default number of rules listed alongside a recommendation.
pub const DEFAULT_TOP_N: NonZeroUsize = match NonZeroUsize::new(5) {
    Some(n) => n,
    None => NonZeroUsize::MIN,
};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading a configuration file
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Minimum support outside (0, 1]
    #[error("min_support must be in (0, 1], got {0}")]
    InvalidMinSupport(f64),

    /// Negative or NaN minimum lift
    #[error("min_lift must be a non-negative number, got {0}")]
    InvalidMinLift(f64),

    /// Zero maximum itemset length
    #[error("max_len must be at least 1")]
    InvalidMaxLen,
}

/// Thresholds applied when mining itemsets and rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MiningThresholds {
    /// Minimum fraction of transactions an itemset must appear in.
    pub min_support: f64,

    /// Minimum lift a rule must reach.
    pub min_lift: f64,

    /// Largest itemset size to enumerate.
    pub max_len: Option<usize>,
}

impl Default for MiningThresholds {
    fn default() -> Self {
        Self {
            min_support: DEFAULT_MIN_SUPPORT,
            min_lift: DEFAULT_MIN_LIFT,
            max_len: None,
        }
    }
}

impl MiningThresholds {
    /// Parse thresholds from YAML; missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the YAML is malformed or a value is out of range.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let thresholds: Self = serde_norway::from_str(contents)?;

        thresholds.validate()?;

        Ok(thresholds)
    }

    /// Load thresholds from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read or parsed, or a value is out of range.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml_str(&contents)
    }

    /// Checks every threshold is in range.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] for the first out-of-range value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_support > 0.0 && self.min_support <= 1.0) {
            return Err(ConfigError::InvalidMinSupport(self.min_support));
        }

        if self.min_lift.is_nan() || self.min_lift < 0.0 {
            return Err(ConfigError::InvalidMinLift(self.min_lift));
        }

        if self.max_len == Some(0) {
            return Err(ConfigError::InvalidMaxLen);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn defaults_match_dashboard_constants() {
        let thresholds = MiningThresholds::default();

        assert!((thresholds.min_support - 0.01).abs() < f64::EPSILON);
        assert!((thresholds.min_lift - 1.0).abs() < f64::EPSILON);
        assert_eq!(thresholds.max_len, None);
        assert_eq!(DEFAULT_TOP_N.get(), 5);
    }

    #[test]
    fn partial_yaml_keeps_defaults() -> TestResult {
        let thresholds = MiningThresholds::from_yaml_str("min_support: 0.05\nmax_len: 3\n")?;

        assert!((thresholds.min_support - 0.05).abs() < f64::EPSILON);
        assert!((thresholds.min_lift - 1.0).abs() < f64::EPSILON);
        assert_eq!(thresholds.max_len, Some(3));

        Ok(())
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = MiningThresholds::from_yaml_str("min_confidence: 0.5\n");

        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(matches!(
            MiningThresholds::from_yaml_str("min_support: 0\n"),
            Err(ConfigError::InvalidMinSupport(_))
        ));
        assert!(matches!(
            MiningThresholds::from_yaml_str("min_lift: -2\n"),
            Err(ConfigError::InvalidMinLift(_))
        ));
        assert!(matches!(
            MiningThresholds::from_yaml_str("max_len: 0\n"),
            Err(ConfigError::InvalidMaxLen)
        ));
    }

    #[test]
    fn loads_from_file() -> TestResult {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "min_support: 0.2")?;
        writeln!(file, "min_lift: 1.5")?;

        let thresholds = MiningThresholds::from_path(file.path())?;

        assert!((thresholds.min_support - 0.2).abs() < f64::EPSILON);
        assert!((thresholds.min_lift - 1.5).abs() < f64::EPSILON);

        Ok(())
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = MiningThresholds::from_path("/definitely/not/here.yml");

        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
