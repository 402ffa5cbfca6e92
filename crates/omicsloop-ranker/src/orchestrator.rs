//! Closed-loop analysis orchestrator.
//!
//! Drives one run through `Selecting → Collecting → Scoring → NetworkBuilding
//! → Validating → Done`. Any error, including cancellation observed between
//! phases, ends the run in `Failed` with a default result carrying the
//! message. `run` never returns an error.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, error, info};

use omicsloop_common::{ClinicalTable, EvidenceType, NumericMatrix, OmicsError, Result};
use omicsloop_config::ClosedLoopConfig;

use crate::analyzers::survival::SurvivalCohort;
use crate::analyzers::{self, AnalysisContext, EvidenceMap};
use crate::network::EvidenceNetwork;
use crate::normalise::EvidenceNormaliser;
use crate::pathway::PathwaySummary;
use crate::result::{AlgorithmStats, ClosedLoopResult, Phase};
use crate::scorer::{rank_causal_genes, EvidenceTable};
use crate::selector::{restrict_to_shared, select_candidates, SelectionInputs};
use crate::stats;
use crate::validation::ValidationMetrics;

/// Everything the caller hands over for one analysis.
#[derive(Debug, Clone, Default)]
pub struct CohortInputs {
    /// Required.
    pub expression: Option<NumericMatrix>,
    /// Required. Survival fields may be absent (synthetic fallback).
    pub clinical: Option<ClinicalTable>,
    pub cnv: Option<NumericMatrix>,
    pub methylation: Option<NumericMatrix>,
    pub mutation: Option<NumericMatrix>,
    /// Analyse exactly these genes instead of running candidate selection.
    pub target_genes: Option<Vec<String>>,
}

impl CohortInputs {
    fn selection_inputs(&self) -> SelectionInputs<'_> {
        SelectionInputs {
            expression: self.expression.as_ref(),
            cnv: self.cnv.as_ref(),
            methylation: self.methylation.as_ref(),
            mutation: self.mutation.as_ref(),
        }
    }
}

/// Cooperative cancellation, checked between phases.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Called with each phase as the run enters it.
pub type PhaseHook = Arc<dyn Fn(Phase) + Send + Sync>;

pub struct ClosedLoopOrchestrator {
    config: ClosedLoopConfig,
    cancel: CancelFlag,
    phase_hook: Option<PhaseHook>,
}

impl ClosedLoopOrchestrator {
    pub fn new(config: ClosedLoopConfig) -> Self {
        Self::with_cancel_flag(config, CancelFlag::new())
    }

    pub fn with_cancel_flag(config: ClosedLoopConfig, cancel: CancelFlag) -> Self {
        Self {
            config,
            cancel,
            phase_hook: None,
        }
    }

    pub fn with_phase_hook(mut self, hook: PhaseHook) -> Self {
        self.phase_hook = Some(hook);
        self
    }

    pub fn config(&self) -> &ClosedLoopConfig {
        &self.config
    }

    /// Handle that cancels this orchestrator's runs from another thread.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Run one analysis. Always returns a well-formed result.
    pub fn run(&self, inputs: &CohortInputs) -> ClosedLoopResult {
        let mut phase = None;
        match self.try_run(inputs, &mut phase) {
            Ok(result) => result,
            Err(e) => {
                match phase {
                    Some(p) => error!("Closed-loop analysis failed during {}: {}", p, e),
                    None => error!("Closed-loop analysis rejected its inputs: {}", e),
                }
                ClosedLoopResult::failed(e.to_string())
            }
        }
    }

    fn enter(&self, phase: &mut Option<Phase>, next: Phase) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(OmicsError::Cancelled {
                phase: next.to_string(),
            });
        }
        debug!("Entering phase {}", next);
        *phase = Some(next);
        if let Some(hook) = &self.phase_hook {
            hook(next);
        }
        Ok(())
    }

    fn try_run(
        &self,
        inputs: &CohortInputs,
        phase: &mut Option<Phase>,
    ) -> Result<ClosedLoopResult> {
        self.config.validate()?;

        let expression = inputs
            .expression
            .as_ref()
            .ok_or_else(|| OmicsError::MissingInput("expression matrix".into()))?;
        if expression.is_empty() {
            return Err(OmicsError::EmptyInput("expression matrix".into()));
        }
        let clinical = inputs
            .clinical
            .as_ref()
            .ok_or_else(|| OmicsError::MissingInput("clinical table".into()))?;

        // ── Selecting ──
        self.enter(phase, Phase::Selecting)?;
        let selection = inputs.selection_inputs();
        let candidates = match &inputs.target_genes {
            Some(targets) => {
                let kept = restrict_to_shared(targets, &selection);
                info!("Using {}/{} caller-supplied target genes", kept.len(), targets.len());
                kept
            }
            None => select_candidates(&selection, &self.config.selection),
        };
        info!("Selected {} candidate genes", candidates.len());

        // ── Collecting ──
        self.enter(phase, Phase::Collecting)?;
        let survival =
            SurvivalCohort::resolve(expression, clinical, self.config.fallback_survival_seed)?;
        let ctx = AnalysisContext {
            expression,
            cnv: inputs.cnv.as_ref(),
            methylation: inputs.methylation.as_ref(),
            mutation: inputs.mutation.as_ref(),
            survival: &survival,
            candidates: &candidates,
            normaliser: EvidenceNormaliser::from_config(&self.config),
            cnv_alteration_cutoff: self.config.selection.cnv_alteration_cutoff,
            background_mutation_rate: self.config.background_mutation_rate,
        };
        let outputs = self.collect_evidence(&ctx);

        let mut analyzer_gene_counts = BTreeMap::new();
        let mut evidence = EvidenceTable::new();
        for (evidence_type, map) in outputs {
            analyzer_gene_counts.insert(evidence_type, map.len());
            for (gene, score) in map {
                evidence.entry(gene).or_default().insert(evidence_type, score);
            }
        }
        info!(
            "Collected evidence for {}/{} candidates",
            evidence.len(),
            candidates.len()
        );

        // ── Scoring ──
        self.enter(phase, Phase::Scoring)?;
        let causal_genes = rank_causal_genes(
            &evidence,
            &self.config.weights,
            self.config.causal_score_threshold,
        );
        info!("{} genes cleared the causal-score threshold", causal_genes.len());

        // ── NetworkBuilding ──
        self.enter(phase, Phase::NetworkBuilding)?;
        let evidence_network =
            EvidenceNetwork::build(&causal_genes, self.config.similarity_threshold);

        // ── Validating ──
        self.enter(phase, Phase::Validating)?;
        let validation_metrics = ValidationMetrics::compute(&causal_genes, &self.config.weights);
        let pathway_analysis = PathwaySummary::summarise(&causal_genes);

        let algorithm_stats = {
            let analysed = evidence.len();
            let scores: Vec<f64> = causal_genes.iter().map(|g| g.causal_score).collect();
            let mut confidence_distribution = BTreeMap::new();
            for gene in &causal_genes {
                *confidence_distribution.entry(gene.confidence_level).or_insert(0) += 1;
            }
            AlgorithmStats {
                candidate_genes: candidates.len(),
                total_genes_analyzed: analysed,
                causal_genes_identified: causal_genes.len(),
                causal_gene_ratio: ratio(causal_genes.len(), analysed),
                mean_causal_score: stats::mean(&scores).unwrap_or(0.0),
                evidence_type_coverage: EvidenceType::ALL
                    .into_iter()
                    .map(|t| {
                        let carrying = evidence.values().filter(|e| e.contains_key(&t)).count();
                        (t, ratio(carrying, analysed))
                    })
                    .collect(),
                confidence_distribution,
                analyzer_gene_counts,
                survival_data_source: Some(survival.source()),
            }
        };

        *phase = Some(Phase::Done);
        info!(
            "Closed-loop analysis done: {} causal genes, {} network edges",
            causal_genes.len(),
            evidence_network.edge_count()
        );

        Ok(ClosedLoopResult {
            causal_genes,
            evidence_network,
            pathway_analysis,
            validation_metrics,
            algorithm_stats,
            phase: Phase::Done,
            success: true,
            errors: Vec::new(),
        })
    }

    /// Run every configured analyzer whose data source is present. Each
    /// analyzer fills a private map; results come back in canonical order.
    fn collect_evidence(&self, ctx: &AnalysisContext<'_>) -> Vec<(EvidenceType, EvidenceMap)> {
        let runnable: Vec<EvidenceType> = self
            .config
            .weights
            .configured_types()
            .into_iter()
            .filter(|t| {
                let present = ctx.has_source(*t);
                if !present {
                    info!("Skipping {} evidence: no data supplied", t);
                }
                present
            })
            .collect();

        let run = |t: &EvidenceType| analyzers::analyze(*t, ctx).map(|map| (*t, map));
        if self.config.parallel_analyzers {
            runnable.par_iter().filter_map(run).collect()
        } else {
            runnable.iter().filter_map(run).collect()
        }
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use omicsloop_common::ClinicalRecord;

    fn samples(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("S{i:02}")).collect()
    }

    fn inputs() -> CohortInputs {
        let n = 12;
        let driver: Vec<f64> = (0..n)
            .map(|i| {
                let base = if i >= n / 2 { 8.0 } else { 2.0 };
                base + i as f64 * 0.1
            })
            .collect();
        let flat_ish: Vec<f64> = (0..n).map(|i| 5.0 + (i % 3) as f64 * 0.01).collect();
        let expression = NumericMatrix::from_rows(
            samples(n),
            vec![("DRIVER".into(), driver), ("PASSENGER".into(), flat_ish)],
        )
        .unwrap();
        let clinical = ClinicalTable::new(
            samples(n)
                .into_iter()
                .map(|s| ClinicalRecord::new(s).with_covariate("age", 60.0))
                .collect(),
        )
        .unwrap();
        CohortInputs {
            expression: Some(expression),
            clinical: Some(clinical),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_clinical_fails() {
        let mut i = inputs();
        i.clinical = None;
        let r = ClosedLoopOrchestrator::new(ClosedLoopConfig::default()).run(&i);
        assert!(!r.success);
        assert_eq!(r.phase, Phase::Failed);
        assert!(r.errors[0].contains("clinical table"));
    }

    #[test]
    fn test_invalid_config_fails() {
        let mut config = ClosedLoopConfig::default();
        config.weights.cnv_driver = 0.9;
        let r = ClosedLoopOrchestrator::new(config).run(&inputs());
        assert!(!r.success);
        assert!(!r.errors.is_empty());
    }

    #[test]
    fn test_cancelled_before_start() {
        let orchestrator = ClosedLoopOrchestrator::new(ClosedLoopConfig::default());
        orchestrator.cancel_flag().cancel();
        let r = orchestrator.run(&inputs());
        assert!(!r.success);
        assert!(r.errors[0].contains("cancelled"), "{:?}", r.errors);
        assert!(r.causal_genes.is_empty());
    }

    #[test]
    fn test_cancelled_between_phases() {
        let cancel = CancelFlag::new();
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let hook: PhaseHook = {
            let cancel = cancel.clone();
            let seen = Arc::clone(&seen);
            Arc::new(move |phase: Phase| {
                seen.lock().unwrap().push(phase);
                if phase == Phase::Scoring {
                    cancel.cancel();
                }
            })
        };
        let orchestrator =
            ClosedLoopOrchestrator::with_cancel_flag(ClosedLoopConfig::default(), cancel)
                .with_phase_hook(hook);

        let r = orchestrator.run(&inputs());
        assert!(!r.success);
        assert_eq!(r.phase, Phase::Failed);
        assert!(r.errors[0].contains("network_building"), "{:?}", r.errors);
        assert!(r.causal_genes.is_empty());
        assert_eq!(
            *seen.lock().unwrap(),
            vec![Phase::Selecting, Phase::Collecting, Phase::Scoring]
        );
    }

    #[test]
    fn test_phase_hook_sees_every_phase() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let hook: PhaseHook = {
            let seen = Arc::clone(&seen);
            Arc::new(move |phase: Phase| seen.lock().unwrap().push(phase))
        };
        let r = ClosedLoopOrchestrator::new(ClosedLoopConfig::default())
            .with_phase_hook(hook)
            .run(&inputs());
        assert!(r.success);
        assert_eq!(seen.lock().unwrap().len(), 5);
    }

    #[test]
    fn test_sequential_and_parallel_agree() {
        let parallel = ClosedLoopOrchestrator::new(ClosedLoopConfig::default()).run(&inputs());
        let sequential = ClosedLoopOrchestrator::new(ClosedLoopConfig {
            parallel_analyzers: false,
            ..ClosedLoopConfig::default()
        })
        .run(&inputs());
        assert!(parallel.success);
        assert_eq!(parallel, sequential);
        assert_eq!(parallel.phase, Phase::Done);
    }

    #[test]
    fn test_synthetic_survival_is_reported() {
        let r = ClosedLoopOrchestrator::new(ClosedLoopConfig::default()).run(&inputs());
        assert_eq!(
            r.algorithm_stats.survival_data_source,
            Some(crate::analyzers::survival::SurvivalSource::Synthetic)
        );
        assert_eq!(r.algorithm_stats.candidate_genes, 2);
        assert_eq!(r.algorithm_stats.evidence_type_coverage.len(), 5);
        assert_eq!(r.algorithm_stats.evidence_type_coverage[&EvidenceType::CnvDriver], 0.0);
        assert!(!r.algorithm_stats.analyzer_gene_counts.contains_key(&EvidenceType::CnvDriver));
    }

    #[test]
    fn test_target_genes_bypass_selection() {
        let mut i = inputs();
        i.target_genes = Some(vec!["DRIVER".into(), "NOT_MEASURED".into()]);
        let r = ClosedLoopOrchestrator::new(ClosedLoopConfig::default()).run(&i);
        assert!(r.success);
        assert_eq!(r.algorithm_stats.candidate_genes, 1);
    }
}
