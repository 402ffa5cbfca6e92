//! Shared evidence normalisation contract.
//!
//! All five analyzers map `(p_value, effect_size)` onto [0, 1] through the
//! same two formulas so their scores are comparable in the causal score:
//!
//! ```text
//! confidence = clamp01((-log10(max(p, 1e-10)) / 10 + clamp01(effect / effect_thr)) / 2)
//! score      = clamp01(sig * 0.4 + clamp01(effect / effect_thr) * 0.4 + confidence * 0.2)
//! sig        = clamp01(-log10(p) / 10)   if p < p_thr, else 0
//! ```

use std::collections::BTreeMap;

use omicsloop_common::{EvidenceScore, EvidenceType};
use omicsloop_config::ClosedLoopConfig;

/// Floor applied to p-values before taking logarithms.
pub const P_VALUE_FLOOR: f64 = 1e-10;

pub fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// `-log10(max(p, 1e-10)) / 10`, capped to [0, 1].
fn significance(p_value: f64) -> f64 {
    clamp01(-p_value.max(P_VALUE_FLOOR).log10() / 10.0)
}

/// Thresholds of the normalisation contract, copied out of the run config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvidenceNormaliser {
    pub p_value_threshold: f64,
    pub effect_size_threshold: f64,
}

impl EvidenceNormaliser {
    pub fn new(p_value_threshold: f64, effect_size_threshold: f64) -> Self {
        Self {
            p_value_threshold,
            effect_size_threshold,
        }
    }

    pub fn from_config(config: &ClosedLoopConfig) -> Self {
        Self::new(config.p_value_threshold, config.effect_size_threshold)
    }

    fn effect_component(&self, effect_size: f64) -> f64 {
        clamp01(effect_size / self.effect_size_threshold)
    }

    pub fn confidence(&self, p_value: f64, effect_size: f64) -> f64 {
        clamp01((significance(p_value) + self.effect_component(effect_size)) / 2.0)
    }

    pub fn score(&self, p_value: f64, effect_size: f64, confidence: f64) -> f64 {
        let significance_component = if p_value < self.p_value_threshold {
            significance(p_value)
        } else {
            0.0
        };
        let effect_component = self.effect_component(effect_size);
        clamp01(significance_component * 0.4 + effect_component * 0.4 + confidence * 0.2)
    }

    /// Build an [`EvidenceScore`] through the contract.
    ///
    /// Returns `None` when the statistic is not finite, so a degenerate gene
    /// is omitted instead of carrying NaN downstream.
    pub fn evidence(
        &self,
        gene_id: &str,
        evidence_type: EvidenceType,
        p_value: f64,
        effect_size: f64,
        metadata: BTreeMap<String, f64>,
    ) -> Option<EvidenceScore> {
        if !p_value.is_finite() || !effect_size.is_finite() {
            return None;
        }
        let p_value = clamp01(p_value);
        let effect_size = effect_size.abs();
        let confidence = self.confidence(p_value, effect_size);
        let score = self.score(p_value, effect_size, confidence);

        Some(EvidenceScore {
            gene_id: gene_id.to_string(),
            evidence_type,
            score,
            p_value,
            effect_size,
            confidence,
            metadata,
        })
    }
}

impl Default for EvidenceNormaliser {
    fn default() -> Self {
        Self::from_config(&ClosedLoopConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strong_evidence_scores_high() {
        let n = EvidenceNormaliser::default();
        // p = 1e-10 → significance 1.0; effect ≥ threshold → 1.0
        let c = n.confidence(1e-10, 0.9);
        assert!((c - 1.0).abs() < 1e-12);
        assert!((n.score(1e-10, 0.9, c) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_insignificant_p_drops_significance_component() {
        let n = EvidenceNormaliser::default();
        let c = n.confidence(0.2, 0.15);
        // confidence = (0.0699 + 0.5) / 2
        assert!((c - (-(0.2f64).log10() / 10.0 + 0.5) / 2.0).abs() < 1e-12);
        // score = 0 * 0.4 + 0.5 * 0.4 + c * 0.2
        assert!((n.score(0.2, 0.15, c) - (0.2 + c * 0.2)).abs() < 1e-12);
    }

    #[test]
    fn test_zero_p_value_is_floored() {
        let n = EvidenceNormaliser::default();
        let c = n.confidence(0.0, 0.0);
        assert!((c - 0.5).abs() < 1e-12);
        let s = n.score(0.0, 0.0, c);
        assert!(s.is_finite());
        assert!((s - (0.4 + 0.1)).abs() < 1e-12);
    }

    #[test]
    fn test_evidence_rejects_non_finite() {
        let n = EvidenceNormaliser::default();
        assert!(n
            .evidence("TP53", EvidenceType::CnvDriver, f64::NAN, 0.3, BTreeMap::new())
            .is_none());
        let e = n
            .evidence("TP53", EvidenceType::CnvDriver, 0.01, 0.3, BTreeMap::new())
            .unwrap();
        assert!((0.0..=1.0).contains(&e.score));
        assert!((0.0..=1.0).contains(&e.confidence));
    }
}
