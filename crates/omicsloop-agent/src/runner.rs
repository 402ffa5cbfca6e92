//! Runs one analysis on a blocking worker and wraps the result in a report.
//!
//! The orchestrator is CPU-bound and synchronous. A wall-clock timeout or
//! Ctrl-C raises its cancel flag; the run then stops at the next phase
//! boundary and comes back as a failed result.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use omicsloop_config::ClosedLoopConfig;
use omicsloop_ranker::{ClosedLoopOrchestrator, ClosedLoopResult, CohortInputs, Phase};

use crate::config::Config;
use crate::matrix_io::{load_clinical, load_matrix};

/// JSON envelope written by the binary.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub analysis_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub config: ClosedLoopConfig,
    pub result: ClosedLoopResult,
}

async fn load_optional(path: Option<&str>) -> Result<Option<omicsloop_common::NumericMatrix>> {
    match path {
        Some(p) => Ok(Some(load_matrix(p).await?)),
        None => Ok(None),
    }
}

/// Read every configured input file.
pub async fn load_inputs(config: &Config) -> Result<CohortInputs> {
    let inputs = &config.inputs;
    Ok(CohortInputs {
        expression: Some(load_matrix(&inputs.expression).await?),
        clinical: Some(load_clinical(&inputs.clinical).await?),
        cnv: load_optional(inputs.cnv.as_deref()).await?,
        methylation: load_optional(inputs.methylation.as_deref()).await?,
        mutation: load_optional(inputs.mutation.as_deref()).await?,
        target_genes: inputs.target_genes.clone(),
    })
}

/// Run the orchestrator off the async runtime, cancelling it on timeout or
/// Ctrl-C.
pub async fn run_analysis(
    config: ClosedLoopConfig,
    inputs: CohortInputs,
    timeout: Option<Duration>,
) -> Result<AnalysisReport> {
    let analysis_id = Uuid::new_v4();
    let started_at = Utc::now();
    let clock = Instant::now();
    info!("Starting analysis {}", analysis_id);

    let orchestrator = ClosedLoopOrchestrator::new(config.clone()).with_phase_hook(Arc::new(
        move |phase: Phase| debug!("Analysis {} entering {}", analysis_id, phase),
    ));
    let cancel = orchestrator.cancel_flag();
    let mut handle = tokio::task::spawn_blocking(move || orchestrator.run(&inputs));

    let deadline = async {
        match timeout {
            Some(limit) => tokio::time::sleep(limit).await,
            None => std::future::pending::<()>().await,
        }
    };

    let result = tokio::select! {
        joined = &mut handle => joined.context("analysis worker panicked")?,
        _ = deadline => {
            warn!("Analysis {} exceeded its time limit; cancelling", analysis_id);
            cancel.cancel();
            handle.await.context("analysis worker panicked")?
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted; cancelling analysis {}", analysis_id);
            cancel.cancel();
            handle.await.context("analysis worker panicked")?
        }
    };

    let duration_ms = clock.elapsed().as_millis() as u64;
    info!(
        "Analysis {} finished in {} ms (success: {})",
        analysis_id, duration_ms, result.success
    );

    Ok(AnalysisReport {
        analysis_id,
        started_at,
        finished_at: Utc::now(),
        duration_ms,
        config,
        result,
    })
}

pub async fn write_report(report: &AnalysisReport, path: &str, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(report)?
    } else {
        serde_json::to_string(report)?
    };
    let parent = std::path::Path::new(path).parent();
    if let Some(parent) = parent.filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("writing {path}"))?;
    info!("Report written to {}", path);
    Ok(())
}
