//! omicsloop — multi-omics causal driver gene analysis.
//! Entry point for the batch runner binary.

mod config;
mod matrix_io;
mod runner;

use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("omicsloop=debug,info")),
        )
        .init();

    info!("omicsloop starting up...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_path = config::Config::path();
    let config = match config::Config::load_from(&config_path)? {
        Some(c) => {
            info!(
                "Configuration loaded. Causal threshold: {}, evidence types: {}",
                c.analysis.causal_score_threshold,
                c.analysis
                    .weights
                    .configured_types()
                    .iter()
                    .map(|t| t.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            c
        }
        None => {
            warn!("Config file not found: {}", config_path);
            warn!("Copy omicsloop.example.toml to omicsloop.toml and edit it.");
            return Ok(());
        }
    };

    let inputs = runner::load_inputs(&config).await?;
    let timeout = config.output.timeout_secs.map(Duration::from_secs);

    let report = runner::run_analysis(config.analysis.clone(), inputs, timeout).await?;
    runner::write_report(&report, &config.output.report_path, config.output.pretty).await?;

    if report.result.success {
        info!(
            "{} causal genes identified ({} high confidence)",
            report.result.algorithm_stats.causal_genes_identified,
            report
                .result
                .algorithm_stats
                .confidence_distribution
                .get(&omicsloop_common::ConfidenceLevel::High)
                .copied()
                .unwrap_or(0)
        );
        for gene in report.result.causal_genes.iter().take(10) {
            info!(
                "  {:<12} {:.3} {}",
                gene.gene_id, gene.causal_score, gene.confidence_level
            );
        }
        Ok(())
    } else {
        anyhow::bail!("analysis failed: {}", report.result.errors.join("; "))
    }
}
