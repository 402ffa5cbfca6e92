//! Methylation regulation evidence.
//!
//! Promoter methylation is expected to silence expression, so a regulated
//! gene shows a (typically negative) correlation between beta value and
//! expression. The sign is reported in metadata but does not affect scoring.

use std::collections::BTreeMap;

use omicsloop_common::{EvidenceType, NumericMatrix};

use super::{collect, paired_with_expression, AnalysisContext, EvidenceMap};
use crate::stats;

/// Beta above which a sample counts as hypermethylated.
pub const HYPERMETHYLATED_BETA: f64 = 0.7;
/// Beta below which a sample counts as hypomethylated.
pub const HYPOMETHYLATED_BETA: f64 = 0.3;

pub fn analyze(ctx: &AnalysisContext<'_>, methylation: &NumericMatrix) -> EvidenceMap {
    let columns = ctx.expression.aligned_columns(methylation);

    collect(ctx, EvidenceType::MethylationRegulation, |gene| {
        let (beta, expression) = paired_with_expression(ctx, methylation, &columns, gene)?;
        let correlation = stats::pearson(&beta, &expression)?;

        let hyper = beta.iter().filter(|&&b| b > HYPERMETHYLATED_BETA).count();
        let hypo = beta.iter().filter(|&&b| b < HYPOMETHYLATED_BETA).count();
        let alteration_frequency = (hyper + hypo) as f64 / beta.len() as f64;

        let metadata = BTreeMap::from([
            ("correlation".to_string(), correlation.r),
            ("hypermethylated_samples".to_string(), hyper as f64),
            ("hypomethylated_samples".to_string(), hypo as f64),
            ("methylation_alteration_freq".to_string(), alteration_frequency),
            ("mean_methylation".to_string(), stats::mean(&beta)?),
            ("std_methylation".to_string(), stats::sample_std(&beta)?),
        ]);

        ctx.normaliser.evidence(
            gene,
            EvidenceType::MethylationRegulation,
            correlation.p_value,
            correlation.r.abs() * alteration_frequency,
            metadata,
        )
    })
}
