//! Mutation frequency evidence.
//!
//! A gene mutated far more often than the background rate is a candidate
//! driver. Significance comes from a one-sided binomial test; the effect size
//! is the mutation frequency itself.

use std::collections::BTreeMap;

use omicsloop_common::{EvidenceType, NumericMatrix};

use super::{collect, AnalysisContext, EvidenceMap};
use crate::stats;

/// Indicator values at or above this count as a mutation call.
pub const MUTATION_CALL_THRESHOLD: f64 = 0.5;

pub fn is_mutated(value: f64) -> bool {
    value >= MUTATION_CALL_THRESHOLD
}

pub fn analyze(ctx: &AnalysisContext<'_>, mutation: &NumericMatrix) -> EvidenceMap {
    let background = ctx.background_mutation_rate;

    collect(ctx, EvidenceType::MutationFrequency, |gene| {
        let calls = mutation.row(gene)?;
        if calls.is_empty() {
            return None;
        }
        let n_mutations = calls.iter().filter(|&&v| is_mutated(v)).count();
        let n_samples = calls.len();
        let frequency = n_mutations as f64 / n_samples as f64;
        let p_value = stats::binomial_at_least(n_mutations as u64, n_samples as u64, background)?;

        let metadata = BTreeMap::from([
            ("mutation_frequency".to_string(), frequency),
            ("n_mutations".to_string(), n_mutations as f64),
            ("n_samples".to_string(), n_samples as f64),
            ("background_rate".to_string(), background),
        ]);

        ctx.normaliser
            .evidence(gene, EvidenceType::MutationFrequency, p_value, frequency, metadata)
    })
}
