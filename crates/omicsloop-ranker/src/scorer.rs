//! Causal score computation.
//!
//! causal_score(g) = Σ(w_t × s_t) / Σ(w_t), summed over the evidence types
//! present for g only, so a gene missing a data layer is neither penalised
//! nor rewarded for it.

use std::collections::BTreeMap;

use tracing::debug;

use omicsloop_common::{
    BiologicalContext, CausalGene, ConfidenceLevel, EvidenceType, GeneEvidence, ValidationStatus,
};
use omicsloop_config::EvidenceWeights;

use crate::stats;

/// Evidence per gene, as merged from all analyzers.
pub type EvidenceTable = BTreeMap<String, GeneEvidence>;

/// Weighted mean of a gene's evidence scores with weights renormalised over
/// the types present. `None` when no present type carries weight.
pub fn compute_causal_score(evidence: &GeneEvidence, weights: &EvidenceWeights) -> Option<f64> {
    let (weighted_sum, total_weight) = EvidenceType::ALL
        .iter()
        .filter_map(|t| evidence.get(t).map(|e| (e.score, weights.get(*t))))
        .filter(|(_, w)| *w > 0.0)
        .fold((0.0, 0.0), |(s, tw), (score, w)| (s + score * w, tw + w));

    if total_weight <= 0.0 {
        return None;
    }
    Some((weighted_sum / total_weight).clamp(0.0, 1.0))
}

fn biological_context(evidence: &GeneEvidence, configured: usize) -> BiologicalContext {
    let p_values: Vec<f64> = evidence.values().map(|e| e.p_value).collect();
    let effects: Vec<f64> = evidence.values().map(|e| e.effect_size).collect();
    BiologicalContext {
        evidence_types: evidence.keys().copied().collect(),
        mean_p_value: stats::mean(&p_values).unwrap_or(1.0),
        mean_effect_size: stats::mean(&effects).unwrap_or(0.0),
        evidence_coverage: if configured == 0 {
            0.0
        } else {
            evidence.len() as f64 / configured as f64
        },
    }
}

fn evidence_chain(evidence: &GeneEvidence) -> Vec<String> {
    evidence
        .iter()
        .map(|(t, e)| format!("{}: {:.3}", t, e.score))
        .collect()
}

/// Turn merged evidence into the ranked causal-gene list.
///
/// Genes below `threshold` are dropped. The output is sorted by descending
/// causal score with ties broken by gene id.
pub fn rank_causal_genes(
    evidence: &EvidenceTable,
    weights: &EvidenceWeights,
    threshold: f64,
) -> Vec<CausalGene> {
    let configured = weights.configured_types().len();

    let mut genes: Vec<CausalGene> = evidence
        .iter()
        .filter_map(|(gene_id, gene_evidence)| {
            let causal_score = compute_causal_score(gene_evidence, weights)?;
            if causal_score < threshold {
                debug!("{}: causal score {:.3} below threshold", gene_id, causal_score);
                return None;
            }
            Some(CausalGene {
                gene_id: gene_id.clone(),
                causal_score,
                evidence_scores: gene_evidence.clone(),
                confidence_level: ConfidenceLevel::from_causal_score(causal_score),
                biological_context: biological_context(gene_evidence, configured),
                evidence_chain: evidence_chain(gene_evidence),
                validation_status: ValidationStatus::Pending,
            })
        })
        .collect();

    genes.sort_by(|a, b| {
        b.causal_score
            .total_cmp(&a.causal_score)
            .then_with(|| a.gene_id.cmp(&b.gene_id))
    });
    genes
}

#[cfg(test)]
mod tests {
    use super::*;
    use omicsloop_common::EvidenceScore;

    fn ev(
        gene: &str,
        t: EvidenceType,
        score: f64,
        p: f64,
        effect: f64,
    ) -> (EvidenceType, EvidenceScore) {
        (
            t,
            EvidenceScore {
                gene_id: gene.to_string(),
                evidence_type: t,
                score,
                p_value: p,
                effect_size: effect,
                confidence: 0.5,
                metadata: BTreeMap::new(),
            },
        )
    }

    #[test]
    fn test_weights_renormalised_over_present_types() {
        let gene: GeneEvidence = BTreeMap::from([
            ev("A", EvidenceType::DifferentialExpression, 0.9, 0.001, 0.8),
            ev("A", EvidenceType::SurvivalAssociation, 0.7, 0.01, 0.5),
        ]);
        let evidence = EvidenceTable::from([("A".to_string(), gene)]);

        let ranked = rank_causal_genes(&evidence, &EvidenceWeights::default(), 0.6);
        assert_eq!(ranked.len(), 1);
        let a = &ranked[0];
        assert!((a.causal_score - 0.8).abs() < 1e-12);
        assert_eq!(a.confidence_level, ConfidenceLevel::High);
        assert_eq!(
            a.evidence_chain,
            vec!["differential_expression: 0.900", "survival_association: 0.700"]
        );
        assert!((a.biological_context.evidence_coverage - 0.4).abs() < 1e-12);
        assert!((a.biological_context.mean_p_value - 0.0055).abs() < 1e-12);
        assert_eq!(a.validation_status, ValidationStatus::Pending);
    }

    #[test]
    fn test_unequal_weights() {
        let gene: GeneEvidence = BTreeMap::from([
            ev("A", EvidenceType::CnvDriver, 1.0, 0.01, 0.5),
            ev("A", EvidenceType::MutationFrequency, 0.4, 0.01, 0.5),
        ]);
        // 0.20 and 0.10 renormalise to 2/3 and 1/3.
        let score = compute_causal_score(&gene, &EvidenceWeights::default()).unwrap();
        assert!((score - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_zero_weight_types_are_ignored() {
        let weights = EvidenceWeights {
            differential_expression: 0.5,
            survival_association: 0.5,
            cnv_driver: 0.0,
            methylation_regulation: 0.0,
            mutation_frequency: 0.0,
        };
        let only_cnv: GeneEvidence =
            BTreeMap::from([ev("A", EvidenceType::CnvDriver, 1.0, 0.01, 0.5)]);
        assert_eq!(compute_causal_score(&only_cnv, &weights), None);
        assert_eq!(compute_causal_score(&GeneEvidence::new(), &weights), None);
    }

    #[test]
    fn test_filter_and_tie_break() {
        let mk = |g: &str, s: f64| {
            (
                g.to_string(),
                BTreeMap::from([ev(g, EvidenceType::DifferentialExpression, s, 0.01, 0.5)]),
            )
        };
        let evidence: EvidenceTable = [mk("B", 0.7), mk("A", 0.7), mk("C", 0.95), mk("LOW", 0.59)]
            .into_iter()
            .collect();

        let ranked = rank_causal_genes(&evidence, &EvidenceWeights::default(), 0.6);
        let ids: Vec<&str> = ranked.iter().map(|g| g.gene_id.as_str()).collect();
        assert_eq!(ids, vec!["C", "A", "B"]);
        assert_eq!(ranked[1].confidence_level, ConfidenceLevel::Medium);
    }
}
