//! Aggregate validation metrics over the final causal-gene list.
//!
//! These are inexpensive internal-consistency heuristics. No external ground
//! truth is consulted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use omicsloop_common::CausalGene;
use omicsloop_config::EvidenceWeights;

use crate::stats;

/// Identifier substrings of well-characterised cancer genes.
pub const KNOWN_CANCER_GENES: [&str; 7] = ["TP53", "MYC", "EGFR", "KRAS", "PIK3CA", "PTEN", "APC"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationMetrics {
    /// Mean fraction of configured evidence types present per gene.
    pub cross_validation_score: f64,
    /// `1 - sd/mean` of the causal scores, clamped to [0, 1].
    pub bootstrap_stability: f64,
    /// Fraction of genes matching a known cancer gene.
    pub literature_support: f64,
}

impl ValidationMetrics {
    pub fn compute(genes: &[CausalGene], weights: &EvidenceWeights) -> Self {
        Self {
            cross_validation_score: cross_validation_score(genes, weights),
            bootstrap_stability: bootstrap_stability(genes),
            literature_support: literature_support(genes),
        }
    }

    pub fn to_map(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("cross_validation_score".to_string(), self.cross_validation_score),
            ("bootstrap_stability".to_string(), self.bootstrap_stability),
            ("literature_support".to_string(), self.literature_support),
        ])
    }
}

pub fn cross_validation_score(genes: &[CausalGene], weights: &EvidenceWeights) -> f64 {
    let configured = weights.configured_types();
    if configured.is_empty() {
        return 0.0;
    }
    let breadth: Vec<f64> = genes
        .iter()
        .map(|g| {
            let present = configured
                .iter()
                .filter(|t| g.evidence_scores.contains_key(t))
                .count();
            present as f64 / configured.len() as f64
        })
        .collect();
    stats::mean(&breadth).unwrap_or(0.0)
}

/// 0 for fewer than two genes.
pub fn bootstrap_stability(genes: &[CausalGene]) -> f64 {
    if genes.len() < 2 {
        return 0.0;
    }
    let scores: Vec<f64> = genes.iter().map(|g| g.causal_score).collect();
    match (stats::mean(&scores), stats::population_std(&scores)) {
        (Some(mean), Some(sd)) if mean > 0.0 => (1.0 - sd / mean).clamp(0.0, 1.0),
        _ => 0.0,
    }
}

pub fn literature_support(genes: &[CausalGene]) -> f64 {
    if genes.is_empty() {
        return 0.0;
    }
    let supported = genes
        .iter()
        .filter(|g| KNOWN_CANCER_GENES.iter().any(|k| g.gene_id.contains(k)))
        .count();
    supported as f64 / genes.len() as f64
}
