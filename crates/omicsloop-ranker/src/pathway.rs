//! Keyword pathway summary.
//!
//! Counts causal genes whose identifier contains a pathway keyword. This is
//! a labelled placeholder, not enrichment analysis: the output always carries
//! `authoritative: false`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use omicsloop_common::CausalGene;

pub const PATHWAY_METHOD: &str = "gene_id_substring_match";

/// `(category, pathway, keywords)`.
const PATHWAY_KEYWORDS: &[(&str, &str, &[&str])] = &[
    ("cancer_pathways", "p53_pathway", &["TP53", "MDM"]),
    ("cancer_pathways", "pi3k_pathway", &["PIK3", "AKT"]),
    ("cancer_pathways", "rb_pathway", &["RB", "CDK"]),
    ("metabolic_pathways", "glycolysis", &["HK", "PFK"]),
    ("metabolic_pathways", "oxidative_phosphorylation", &["COX", "NADH"]),
    ("immune_pathways", "interferon_response", &["IFNG", "STAT"]),
    ("immune_pathways", "nf_kb_pathway", &["NFKB", "IKBK"]),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathwaySummary {
    pub method: String,
    pub authoritative: bool,
    /// category → pathway → matching gene count
    pub matched_pathways: BTreeMap<String, BTreeMap<String, usize>>,
    pub total_genes_analyzed: usize,
    /// Total matches divided by gene count. A gene may match several pathways.
    pub pathway_coverage: f64,
}

impl Default for PathwaySummary {
    fn default() -> Self {
        Self::summarise(&[])
    }
}

impl PathwaySummary {
    pub fn summarise(genes: &[CausalGene]) -> Self {
        let mut matched_pathways: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
        let mut total_matches = 0;

        for (category, pathway, keywords) in PATHWAY_KEYWORDS {
            let count = genes
                .iter()
                .filter(|g| keywords.iter().any(|k| g.gene_id.contains(k)))
                .count();
            total_matches += count;
            matched_pathways
                .entry(category.to_string())
                .or_default()
                .insert(pathway.to_string(), count);
        }

        Self {
            method: PATHWAY_METHOD.to_string(),
            authoritative: false,
            matched_pathways,
            total_genes_analyzed: genes.len(),
            pathway_coverage: if genes.is_empty() {
                0.0
            } else {
                total_matches as f64 / genes.len() as f64
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use omicsloop_common::{BiologicalContext, ConfidenceLevel, ValidationStatus};

    fn gene(id: &str) -> CausalGene {
        CausalGene {
            gene_id: id.to_string(),
            causal_score: 0.7,
            evidence_scores: BTreeMap::new(),
            confidence_level: ConfidenceLevel::Medium,
            biological_context: BiologicalContext {
                evidence_types: Vec::new(),
                mean_p_value: 0.01,
                mean_effect_size: 0.5,
                evidence_coverage: 0.0,
            },
            evidence_chain: Vec::new(),
            validation_status: ValidationStatus::Pending,
        }
    }

    #[test]
    fn test_keyword_counts() {
        let genes = vec![gene("TP53"), gene("MDM2"), gene("PIK3CA"), gene("STAT3"), gene("GAPDH")];
        let s = PathwaySummary::summarise(&genes);

        assert!(!s.authoritative);
        assert_eq!(s.method, PATHWAY_METHOD);
        assert_eq!(s.matched_pathways["cancer_pathways"]["p53_pathway"], 2);
        assert_eq!(s.matched_pathways["cancer_pathways"]["pi3k_pathway"], 1);
        assert_eq!(s.matched_pathways["immune_pathways"]["interferon_response"], 1);
        assert_eq!(s.matched_pathways["metabolic_pathways"]["glycolysis"], 0);
        assert_eq!(s.total_genes_analyzed, 5);
        assert!((s.pathway_coverage - 4.0 / 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_summary_lists_every_pathway() {
        let s = PathwaySummary::default();
        assert_eq!(s.pathway_coverage, 0.0);
        assert_eq!(s.matched_pathways.len(), 3);
        assert_eq!(s.matched_pathways.values().map(|p| p.len()).sum::<usize>(), 7);
    }
}
