//! The engine's output record.

use std::collections::BTreeMap;

use serde::Serialize;

use omicsloop_common::{CausalGene, ConfidenceLevel, EvidenceType};

use crate::analyzers::survival::SurvivalSource;
use crate::network::EvidenceNetwork;
use crate::pathway::PathwaySummary;
use crate::validation::ValidationMetrics;

/// Orchestrator states, in execution order. `Failed` is reachable from any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Selecting,
    Collecting,
    Scoring,
    NetworkBuilding,
    Validating,
    Done,
    Failed,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Selecting => "selecting",
            Phase::Collecting => "collecting",
            Phase::Scoring => "scoring",
            Phase::NetworkBuilding => "network_building",
            Phase::Validating => "validating",
            Phase::Done => "done",
            Phase::Failed => "failed",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counts and ratios describing one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AlgorithmStats {
    pub candidate_genes: usize,
    /// Candidates with at least one evidence score.
    pub total_genes_analyzed: usize,
    pub causal_genes_identified: usize,
    pub causal_gene_ratio: f64,
    pub mean_causal_score: f64,
    /// Fraction of analysed genes carrying each type. All five types are listed.
    pub evidence_type_coverage: BTreeMap<EvidenceType, f64>,
    pub confidence_distribution: BTreeMap<ConfidenceLevel, usize>,
    /// Genes scored by each analyzer that ran.
    pub analyzer_gene_counts: BTreeMap<EvidenceType, usize>,
    pub survival_data_source: Option<SurvivalSource>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClosedLoopResult {
    /// Sorted by descending causal score, ties by gene id.
    pub causal_genes: Vec<CausalGene>,
    pub evidence_network: EvidenceNetwork,
    pub pathway_analysis: PathwaySummary,
    pub validation_metrics: ValidationMetrics,
    pub algorithm_stats: AlgorithmStats,
    pub phase: Phase,
    pub success: bool,
    pub errors: Vec<String>,
}

impl ClosedLoopResult {
    /// A failed run: every field but `errors` left at its default.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            phase: Phase::Failed,
            success: false,
            errors: vec![message.into()],
            ..Self::default()
        }
    }

    pub fn gene(&self, gene_id: &str) -> Option<&CausalGene> {
        self.causal_genes.iter().find(|g| g.gene_id == gene_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_result_shape() {
        let r = ClosedLoopResult::failed("expression matrix is empty");
        assert!(!r.success);
        assert_eq!(r.phase, Phase::Failed);
        assert_eq!(r.errors, vec!["expression matrix is empty"]);
        assert!(r.causal_genes.is_empty());
        assert!(r.evidence_network.is_empty());
        assert_eq!(r.algorithm_stats, AlgorithmStats::default());
    }

    #[test]
    fn test_result_serializes() {
        let json = serde_json::to_value(ClosedLoopResult::failed("boom")).unwrap();
        assert_eq!(json["phase"], "failed");
        assert_eq!(json["success"], false);
        assert_eq!(json["validation_metrics"]["bootstrap_stability"], 0.0);
        assert_eq!(json["pathway_analysis"]["authoritative"], false);
    }
}
