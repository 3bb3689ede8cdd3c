//! Command line configuration

use std::{num::NonZeroUsize, path::PathBuf};

use clap::Parser;

use crate::{
    config::{ConfigError, DEFAULT_TOP_N, MiningThresholds, observability::LoggingConfig},
    transactions::{DayType, PeriodOfDay, TransactionFilter},
};

/// Default location of the transaction log.
pub const DEFAULT_DATA_PATH: &str = "bread basket.csv";

/// Hamper market basket analysis
#[derive(Debug, Parser)]
#[command(
    name = "hamper",
    about = "Recommend items frequently bought together",
    long_about = None
)]
pub struct CliConfig {
    /// Transaction log (CSV with `Transaction` and `Item` columns)
    #[arg(short, long, env = "HAMPER_DATA", default_value = DEFAULT_DATA_PATH)]
    pub data: PathBuf,

    /// YAML file overriding the mining thresholds
    #[arg(short, long, env = "HAMPER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Item to recommend companions for (defaults to `bread`, or the first item)
    #[arg(short, long)]
    pub item: Option<String>,

    /// Only use transactions from this period of the day
    #[arg(long, value_enum)]
    pub period: Option<PeriodOfDay>,

    /// Only use weekday or weekend transactions
    #[arg(long, value_enum)]
    pub day_type: Option<DayType>,

    /// Only use transactions from this month (1-12)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=12))]
    pub month: Option<u8>,

    /// Only use transactions from this day of the week (0-6, Monday = 0)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=6))]
    pub weekday: Option<u8>,

    /// Number of rules to list
    #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_N)]
    pub top: NonZeroUsize,

    /// Print the distinct items and exit
    #[arg(long)]
    pub list_items: bool,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl CliConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        Self::try_parse()
    }

    /// Transaction filter assembled from the filter flags.
    pub fn filter(&self) -> TransactionFilter {
        TransactionFilter {
            period: self.period,
            day_type: self.day_type,
            month: self.month,
            weekday: self.weekday,
        }
    }

    /// Mining thresholds: the defaults, or the contents of `--config`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the configuration file cannot be loaded.
    pub fn thresholds(&self) -> Result<MiningThresholds, ConfigError> {
        self.config
            .as_ref()
            .map_or_else(|| Ok(MiningThresholds::default()), MiningThresholds::from_path)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn defaults() -> TestResult {
        let config = CliConfig::try_parse_from(["hamper"])?;

        assert_eq!(config.data, PathBuf::from(DEFAULT_DATA_PATH));
        assert_eq!(config.top, DEFAULT_TOP_N);
        assert!(config.filter().is_unrestricted());
        assert_eq!(config.thresholds()?, MiningThresholds::default());

        Ok(())
    }

    #[test]
    fn filter_flags() -> TestResult {
        let config = CliConfig::try_parse_from([
            "hamper",
            "--item",
            "coffee",
            "--period",
            "morning",
            "--day-type",
            "weekend",
            "--month",
            "11",
            "--weekday",
            "0",
        ])?;

        assert_eq!(config.item.as_deref(), Some("coffee"));
        assert_eq!(
            config.filter(),
            TransactionFilter {
                period: Some(PeriodOfDay::Morning),
                day_type: Some(DayType::Weekend),
                month: Some(11),
                weekday: Some(0),
            }
        );

        Ok(())
    }

    #[test]
    fn out_of_range_month_is_rejected() {
        assert!(CliConfig::try_parse_from(["hamper", "--month", "13"]).is_err());
        assert!(CliConfig::try_parse_from(["hamper", "--weekday", "7"]).is_err());
        assert!(CliConfig::try_parse_from(["hamper", "--top", "0"]).is_err());
    }
}
