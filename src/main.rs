//! Transaction Analytics - Main Entry Point
//!
//! Loads the configured dataset, runs every summary and the anomaly scorer,
//! and writes the tables the chart renderer consumes.

use anyhow::{Context, Result};
use std::fs;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;
use transaction_analytics::{
    config::{AppConfig, LoggingConfig, DEFAULT_CONFIG_PATH},
    loader,
    report::{self, AnalysisReport},
    AnomalyScorer,
};

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(format!("transaction_analytics={}", logging.level))
    })?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    // Load configuration
    let config = AppConfig::load_from_path(&config_path)
        .with_context(|| format!("Failed to load configuration from {config_path}"))?;

    // Initialize logging
    init_logging(&config.logging)?;
    info!(config = %config_path, "Starting transaction analysis");

    let start_time = Instant::now();

    let (table, validation) = loader::load_with_report(&config.data.input_path).with_context(|| {
        format!(
            "Failed to load transactions from {}",
            config.data.input_path.display()
        )
    })?;
    validation.log_findings();

    let scorer = AnomalyScorer::new(config.scoring.clone());
    let scored = scorer.score(&table);

    let report = AnalysisReport::build(&table, &scored, validation, &config.analysis)
        .context("Failed to summarise transactions")?;
    report.log_summary(&scored);

    fs::create_dir_all(&config.output.dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            config.output.dir.display()
        )
    })?;
    report.write_json(config.output.dir.join("report.json"))?;
    if config.output.write_scored_csv {
        report::write_scored_csv(&scored, config.output.dir.join("scored_transactions.csv"))?;
    }

    info!(
        rows = table.len(),
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "Analysis complete"
    );

    Ok(())
}
