//! Copy-number driver evidence.
//!
//! A copy-number driver should move its own expression: the evidence is the
//! Pearson correlation between log-ratio and expression over shared samples,
//! weighted by how often the gene is altered at all.

use std::collections::BTreeMap;

use omicsloop_common::{EvidenceType, NumericMatrix};

use super::{collect, paired_with_expression, AnalysisContext, EvidenceMap};
use crate::stats;

pub fn analyze(ctx: &AnalysisContext<'_>, cnv: &NumericMatrix) -> EvidenceMap {
    let columns = ctx.expression.aligned_columns(cnv);
    let cutoff = ctx.cnv_alteration_cutoff;

    collect(ctx, EvidenceType::CnvDriver, |gene| {
        let (copy_number, expression) = paired_with_expression(ctx, cnv, &columns, gene)?;
        let correlation = stats::pearson(&copy_number, &expression)?;

        let amplifications = copy_number.iter().filter(|&&v| v > cutoff).count();
        let deletions = copy_number.iter().filter(|&&v| v < -cutoff).count();
        let alteration_frequency = (amplifications + deletions) as f64 / copy_number.len() as f64;

        let metadata = BTreeMap::from([
            ("correlation".to_string(), correlation.r),
            ("amplifications".to_string(), amplifications as f64),
            ("deletions".to_string(), deletions as f64),
            ("alteration_frequency".to_string(), alteration_frequency),
            ("mean_cnv".to_string(), stats::mean(&copy_number)?),
            ("std_cnv".to_string(), stats::sample_std(&copy_number)?),
        ]);

        ctx.normaliser.evidence(
            gene,
            EvidenceType::CnvDriver,
            correlation.p_value,
            correlation.r.abs() * alteration_frequency,
            metadata,
        )
    })
}
