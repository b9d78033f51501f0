//! Configuration management for the analysis run

use crate::types::score::RiskLevelThresholds;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default configuration file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Prefix for environment overrides, e.g. `TXN_ANALYTICS__OUTPUT__DIR`
pub const ENV_PREFIX: &str = "TXN_ANALYTICS";

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    pub data: DataConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Input dataset location
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// CSV file with one transaction per row
    pub input_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("data/upi_transactions.csv"),
        }
    }
}

/// Row limits for ranked tables
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Rows kept by the top-merchants summary
    pub top_merchants: usize,
    /// Rows kept in the highest-risk listing
    pub top_risky: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_merchants: 10,
            top_risky: 20,
        }
    }
}

/// Anomaly scoring rule parameters
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Points for the largest amount; scaled by percentile rank
    pub percentile_points: f64,
    /// Points for a transaction inside the odd-hour window
    pub odd_hour_points: f64,
    /// First hour of the odd-hour window (inclusive)
    pub odd_hour_start: u32,
    /// End of the odd-hour window (exclusive)
    pub odd_hour_end: u32,
    /// Points for an amount above the high-value quantile
    pub high_value_points: f64,
    /// Quantile of the amount column marking a high-value transaction
    pub high_value_quantile: f64,
    pub risk_levels: RiskLevelThresholds,
}

impl ScoringConfig {
    pub fn is_odd_hour(&self, hour: u32) -> bool {
        (self.odd_hour_start..self.odd_hour_end).contains(&hour)
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            percentile_points: 40.0,
            odd_hour_points: 30.0,
            odd_hour_start: 1,
            odd_hour_end: 5,
            high_value_points: 20.0,
            high_value_quantile: 0.95,
            risk_levels: RiskLevelThresholds::default(),
        }
    }
}

/// Where results are written
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    /// Also write the scored table as CSV next to the JSON report
    pub write_scored_csv: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("outputs"),
            write_scored_csv: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default file
    pub fn load() -> Result<Self> {
        Self::load_from_path(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from a specific path, with environment overrides
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject parameter combinations the scorer cannot use
    pub fn validate(&self) -> Result<()> {
        let scoring = &self.scoring;
        if !(0.0..=1.0).contains(&scoring.high_value_quantile) {
            anyhow::bail!(
                "scoring.high_value_quantile must be within [0, 1], got {}",
                scoring.high_value_quantile
            );
        }
        if scoring.odd_hour_start > scoring.odd_hour_end || scoring.odd_hour_end > 24 {
            anyhow::bail!(
                "scoring odd-hour window {}..{} is not a valid range of hours",
                scoring.odd_hour_start,
                scoring.odd_hour_end
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.analysis.top_merchants, 10);
        assert_eq!(config.analysis.top_risky, 20);
        assert_eq!(config.scoring.percentile_points, 40.0);
        assert_eq!(config.scoring.high_value_quantile, 0.95);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_odd_hour_window_is_half_open() {
        let scoring = ScoringConfig::default();
        assert!(!scoring.is_odd_hour(0));
        assert!(scoring.is_odd_hour(1));
        assert!(scoring.is_odd_hour(4));
        assert!(!scoring.is_odd_hour(5));
    }

    #[test]
    fn test_validate_rejects_bad_quantile() {
        let mut config = AppConfig::default();
        config.scoring.high_value_quantile = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_shipped_config() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_CONFIG_PATH);
        let config = AppConfig::load_from_path(path).unwrap();
        assert_eq!(config.scoring, ScoringConfig::default());
        assert_eq!(config.output.dir, PathBuf::from("outputs"));
        assert!(config.output.write_scored_csv);
    }
}
