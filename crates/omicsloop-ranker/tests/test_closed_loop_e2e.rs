//! End-to-end runs of the closed-loop orchestrator on seeded synthetic cohorts.

use omicsloop_common::{ConfidenceLevel, EvidenceType, NumericMatrix};
use omicsloop_config::ClosedLoopConfig;
use omicsloop_ranker::{
    ClosedLoopOrchestrator, ClosedLoopResult, CohortInputs, Phase, SurvivalSource,
};
use omicsloop_test_utils::SyntheticCohort;
use pretty_assertions::assert_eq;

fn inputs(cohort: SyntheticCohort) -> CohortInputs {
    CohortInputs {
        expression: Some(cohort.expression),
        clinical: Some(cohort.clinical),
        cnv: cohort.cnv,
        methylation: cohort.methylation,
        mutation: cohort.mutation,
        target_genes: None,
    }
}

fn multi_omics() -> CohortInputs {
    inputs(
        SyntheticCohort::builder(11)
            .driver("TP53")
            .driver("KRAS")
            .multi_omics()
            .build(),
    )
}

fn run(config: ClosedLoopConfig, inputs: &CohortInputs) -> ClosedLoopResult {
    ClosedLoopOrchestrator::new(config).run(inputs)
}

fn assert_invariants(result: &ClosedLoopResult, config: &ClosedLoopConfig) {
    for gene in &result.causal_genes {
        assert!(gene.causal_score >= config.causal_score_threshold);
        for e in gene.evidence_scores.values() {
            assert!((0.0..=1.0).contains(&e.score), "{} {}", gene.gene_id, e.evidence_type);
            assert!((0.0..=1.0).contains(&e.confidence));
            assert!((0.0..=1.0).contains(&e.p_value));
            assert!(e.effect_size >= 0.0);
        }
    }
    for pair in result.causal_genes.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(
            a.causal_score > b.causal_score
                || (a.causal_score == b.causal_score && a.gene_id < b.gene_id)
        );
    }
    for node in result.evidence_network.nodes() {
        assert!(result.gene(&node.gene_id).is_some());
    }
    for edge in result.evidence_network.edges() {
        assert!(edge.similarity > config.similarity_threshold);
    }
}

#[test]
fn test_planted_drivers_rank_first() {
    let config = ClosedLoopConfig::default();
    let result = run(config.clone(), &multi_omics());

    assert!(result.success, "{:?}", result.errors);
    assert_eq!(result.phase, Phase::Done);
    assert_invariants(&result, &config);

    let top: Vec<&str> = result.causal_genes.iter().take(2).map(|g| g.gene_id.as_str()).collect();
    assert!(top.contains(&"TP53") && top.contains(&"KRAS"), "top genes: {:?}", top);

    let tp53 = result.gene("TP53").unwrap();
    assert_eq!(tp53.confidence_level, ConfidenceLevel::High);
    assert_eq!(tp53.evidence_scores.len(), 5);
    assert_eq!(tp53.evidence_chain.len(), 5);
    assert!(result.evidence_network.contains("TP53"));
    assert_eq!(result.algorithm_stats.survival_data_source, Some(SurvivalSource::Clinical));
    assert!(result.validation_metrics.literature_support > 0.0);
}

#[test]
fn test_runs_are_idempotent() {
    let cohort = multi_omics();
    let first = run(ClosedLoopConfig::default(), &cohort);
    let second = run(ClosedLoopConfig::default(), &cohort);
    assert_eq!(first, second);
}

#[test]
fn test_parallel_and_sequential_runs_agree() {
    let cohort = multi_omics();
    let parallel = run(ClosedLoopConfig::default(), &cohort);
    let sequential = run(
        ClosedLoopConfig {
            parallel_analyzers: false,
            ..ClosedLoopConfig::default()
        },
        &cohort,
    );
    assert_eq!(parallel, sequential);
}

#[test]
fn test_empty_expression_fails() {
    let mut cohort = multi_omics();
    cohort.expression = Some(NumericMatrix::empty());
    let result = run(ClosedLoopConfig::default(), &cohort);

    assert!(!result.success);
    assert_eq!(result.phase, Phase::Failed);
    assert!(result.causal_genes.is_empty());
    assert!(!result.errors.is_empty());
}

#[test]
fn test_missing_expression_fails() {
    let mut cohort = multi_omics();
    cohort.expression = None;
    let result = run(ClosedLoopConfig::default(), &cohort);
    assert!(!result.success);
    assert!(result.errors[0].contains("expression"));
}

#[test]
fn test_mutation_only_coverage() {
    let cohort = inputs(SyntheticCohort::builder(3).driver("PIK3CA").with_mutation().build());
    let result = run(ClosedLoopConfig::default(), &cohort);
    assert!(result.success);

    let coverage = &result.algorithm_stats.evidence_type_coverage;
    assert_eq!(coverage.len(), 5);
    assert_eq!(coverage[&EvidenceType::CnvDriver], 0.0);
    assert_eq!(coverage[&EvidenceType::MethylationRegulation], 0.0);
    assert!(coverage[&EvidenceType::MutationFrequency] > 0.0);
    assert!(coverage[&EvidenceType::DifferentialExpression] > 0.0);
}

#[test]
fn test_genes_below_threshold_are_excluded() {
    let config = ClosedLoopConfig {
        causal_score_threshold: 0.99,
        ..ClosedLoopConfig::default()
    };
    let cohort = inputs(SyntheticCohort::builder(5).multi_omics().build());
    let result = run(config.clone(), &cohort);

    assert!(result.success);
    assert!(result.causal_genes.is_empty());
    assert!(result.evidence_network.is_empty());
    assert_eq!(result.algorithm_stats.analyzer_gene_counts.len(), 5);
    assert!(result.algorithm_stats.total_genes_analyzed > 0);
    assert_eq!(result.algorithm_stats.causal_gene_ratio, 0.0);
}

#[test]
fn test_missing_survival_falls_back_to_synthetic() {
    let cohort = inputs(SyntheticCohort::builder(9).driver("EGFR").without_survival().build());
    let result = run(ClosedLoopConfig::default(), &cohort);
    assert!(result.success);
    assert_eq!(result.algorithm_stats.survival_data_source, Some(SurvivalSource::Synthetic));
    assert!(result.algorithm_stats.analyzer_gene_counts[&EvidenceType::SurvivalAssociation] > 0);
}

#[test]
fn test_target_genes_restrict_candidates() {
    let mut cohort = multi_omics();
    cohort.target_genes = Some(vec!["KRAS".into(), "GENE0001".into(), "NOT_MEASURED".into()]);
    let result = run(ClosedLoopConfig::default(), &cohort);
    assert!(result.success);
    assert_eq!(result.algorithm_stats.candidate_genes, 2);
    assert!(result.gene("KRAS").is_some());
}

#[test]
fn test_zero_weight_type_is_not_computed() {
    let mut config = ClosedLoopConfig::default();
    config.weights.mutation_frequency = 0.0;
    config.weights.normalise();
    let result = run(config.clone(), &multi_omics());

    assert!(result.success, "{:?}", result.errors);
    assert!(!result
        .algorithm_stats
        .analyzer_gene_counts
        .contains_key(&EvidenceType::MutationFrequency));
    assert_invariants(&result, &config);
}
