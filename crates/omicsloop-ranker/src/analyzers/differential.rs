//! Differential expression evidence.
//!
//! Samples are split at the median of their per-sample median expression
//! (a stand-in for tumour/normal labels), then each gene is compared across
//! the two groups with a Student t-test. Effect size is Cohen's d.

use std::collections::BTreeMap;

use omicsloop_common::{EvidenceType, NumericMatrix};

use super::{collect, AnalysisContext, EvidenceMap};
use crate::stats;

/// `true` for samples whose median expression lies above the cohort median.
pub fn high_expression_samples(expression: &NumericMatrix) -> Vec<bool> {
    let sample_medians: Vec<f64> = (0..expression.n_samples())
        .map(|j| {
            let column: Vec<f64> = expression.column(j).collect();
            stats::median(&column).unwrap_or(0.0)
        })
        .collect();
    let Some(threshold) = stats::median(&sample_medians) else {
        return Vec::new();
    };
    sample_medians.iter().map(|&m| m > threshold).collect()
}

pub fn analyze(ctx: &AnalysisContext<'_>) -> EvidenceMap {
    let high = high_expression_samples(ctx.expression);

    collect(ctx, EvidenceType::DifferentialExpression, |gene| {
        let row = ctx.expression.row(gene)?;
        let (mut high_group, mut low_group) = (Vec::new(), Vec::new());
        for (value, is_high) in row.iter().zip(&high) {
            if *is_high {
                high_group.push(*value);
            } else {
                low_group.push(*value);
            }
        }

        let t = stats::student_t_test(&high_group, &low_group)?;

        let metadata = BTreeMap::from([
            ("t_statistic".to_string(), t.statistic),
            ("high_group_mean".to_string(), t.mean_a),
            ("low_group_mean".to_string(), t.mean_b),
            ("high_group_size".to_string(), high_group.len() as f64),
            ("low_group_size".to_string(), low_group.len() as f64),
        ]);
        ctx.normaliser.evidence(
            gene,
            EvidenceType::DifferentialExpression,
            t.p_value,
            t.cohens_d,
            metadata,
        )
    })
}
