//! Evidence analyzers, one per [`EvidenceType`].
//!
//! Each analyzer reads the matrices it needs through an [`AnalysisContext`]
//! and writes its own private [`EvidenceMap`]. A gene whose statistic is
//! degenerate is simply left out of that map; nothing is escalated.

pub mod differential;
pub mod survival;
pub mod cnv;
pub mod methylation;
pub mod mutation;

use std::collections::BTreeMap;

use tracing::debug;

use omicsloop_common::{EvidenceScore, EvidenceType, NumericMatrix};

use crate::normalise::EvidenceNormaliser;
use survival::SurvivalCohort;

/// One analyzer's output, keyed by gene id.
pub type EvidenceMap = BTreeMap<String, EvidenceScore>;

/// Read-only inputs shared by all analyzers in one run.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisContext<'a> {
    pub expression: &'a NumericMatrix,
    pub cnv: Option<&'a NumericMatrix>,
    pub methylation: Option<&'a NumericMatrix>,
    pub mutation: Option<&'a NumericMatrix>,
    pub survival: &'a SurvivalCohort,
    pub candidates: &'a [String],
    pub normaliser: EvidenceNormaliser,
    pub cnv_alteration_cutoff: f64,
    pub background_mutation_rate: f64,
}

impl AnalysisContext<'_> {
    /// Whether the data source behind `evidence_type` was supplied.
    pub fn has_source(&self, evidence_type: EvidenceType) -> bool {
        match evidence_type {
            EvidenceType::DifferentialExpression | EvidenceType::SurvivalAssociation => true,
            EvidenceType::CnvDriver => self.cnv.is_some(),
            EvidenceType::MethylationRegulation => self.methylation.is_some(),
            EvidenceType::MutationFrequency => self.mutation.is_some(),
        }
    }
}

/// Run the analyzer for `evidence_type`.
///
/// Returns `None` when its optional data source is absent.
pub fn analyze(evidence_type: EvidenceType, ctx: &AnalysisContext<'_>) -> Option<EvidenceMap> {
    match evidence_type {
        EvidenceType::DifferentialExpression => Some(differential::analyze(ctx)),
        EvidenceType::SurvivalAssociation => Some(survival::analyze(ctx)),
        EvidenceType::CnvDriver => ctx.cnv.map(|cnv| cnv::analyze(ctx, cnv)),
        EvidenceType::MethylationRegulation => {
            ctx.methylation.map(|meth| methylation::analyze(ctx, meth))
        }
        EvidenceType::MutationFrequency => ctx.mutation.map(|m| mutation::analyze(ctx, m)),
    }
}

/// Apply `per_gene` to every candidate, keeping only the genes it scored.
fn collect<F>(ctx: &AnalysisContext<'_>, evidence_type: EvidenceType, per_gene: F) -> EvidenceMap
where
    F: Fn(&str) -> Option<EvidenceScore>,
{
    let mut out = EvidenceMap::new();
    for gene in ctx.candidates {
        match per_gene(gene) {
            Some(score) => {
                out.insert(gene.clone(), score);
            }
            None => debug!("{}: omitting {} (degenerate statistic)", evidence_type, gene),
        }
    }
    debug!(
        "{}: scored {}/{} candidates",
        evidence_type,
        out.len(),
        ctx.candidates.len()
    );
    out
}

/// Paired values of `gene` in `other` and the expression matrix over shared samples.
fn paired_with_expression(
    ctx: &AnalysisContext<'_>,
    other: &NumericMatrix,
    columns: &[(usize, usize)],
    gene: &str,
) -> Option<(Vec<f64>, Vec<f64>)> {
    let expr = ctx.expression.row(gene)?;
    let layer = other.row(gene)?;
    Some(columns.iter().map(|&(e, o)| (layer[o], expr[e])).unzip())
}
