//! Closed-loop analysis configuration.
//!
//! Passed explicitly into the orchestrator at construction time. Every field
//! has a serde default so partial YAML/JSON/TOML documents are accepted.

use serde::{Deserialize, Serialize};

use omicsloop_common::{OmicsError, Result};

use crate::weights::EvidenceWeights;

/// Complete configuration for one closed-loop causal analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedLoopConfig {
    /// Per-evidence-type weights
    #[serde(default)]
    pub weights: EvidenceWeights,

    /// p-values at or above this contribute no significance component
    #[serde(default = "default_p_value_threshold")]
    pub p_value_threshold: f64,

    /// Effect size at which the effect component saturates
    #[serde(default = "default_effect_size_threshold")]
    pub effect_size_threshold: f64,

    /// Genes scoring below this are dropped from the result
    #[serde(default = "default_causal_score_threshold")]
    pub causal_score_threshold: f64,

    /// Evidence-network edges require similarity strictly above this
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    #[serde(default)]
    pub selection: SelectionConfig,

    /// Background per-gene mutation rate for the binomial test
    #[serde(default = "default_background_rate")]
    pub background_mutation_rate: f64,

    /// Seed for the synthetic survival data used when clinical survival is absent
    #[serde(default = "default_fallback_seed")]
    pub fallback_survival_seed: u64,

    /// Run the evidence analyzers on the rayon pool
    #[serde(default = "default_true")]
    pub parallel_analyzers: bool,
}

fn default_p_value_threshold() -> f64 { 0.05 }
fn default_effect_size_threshold() -> f64 { 0.3 }
fn default_causal_score_threshold() -> f64 { 0.6 }
fn default_similarity_threshold() -> f64 { 0.5 }
fn default_background_rate() -> f64 { 0.01 }
fn default_fallback_seed() -> u64 { 42 }
fn default_true() -> bool { true }

impl Default for ClosedLoopConfig {
    fn default() -> Self {
        Self {
            weights: EvidenceWeights::default(),
            p_value_threshold: default_p_value_threshold(),
            effect_size_threshold: default_effect_size_threshold(),
            causal_score_threshold: default_causal_score_threshold(),
            similarity_threshold: default_similarity_threshold(),
            selection: SelectionConfig::default(),
            background_mutation_rate: default_background_rate(),
            fallback_survival_seed: default_fallback_seed(),
            parallel_analyzers: true,
        }
    }
}

// ── Candidate selection ───────────────────────────────────────────────────────

/// Limits used to narrow the gene universe before scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Number of highest-variance expression genes admitted
    #[serde(default = "default_top_variance")]
    pub top_variance_genes: usize,

    /// |log-ratio| above which a sample counts as copy-number altered
    #[serde(default = "default_cnv_cutoff")]
    pub cnv_alteration_cutoff: f64,

    /// Fraction of altered samples a gene must exceed to be admitted
    #[serde(default = "default_cnv_frequency")]
    pub cnv_frequency_cutoff: f64,

    /// Fraction of mutated samples a gene must exceed to be admitted
    #[serde(default = "default_mutation_frequency")]
    pub mutation_frequency_cutoff: f64,
}

fn default_top_variance() -> usize { 1000 }
fn default_cnv_cutoff() -> f64 { 0.5 }
fn default_cnv_frequency() -> f64 { 0.10 }
fn default_mutation_frequency() -> f64 { 0.05 }

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            top_variance_genes: default_top_variance(),
            cnv_alteration_cutoff: default_cnv_cutoff(),
            cnv_frequency_cutoff: default_cnv_frequency(),
            mutation_frequency_cutoff: default_mutation_frequency(),
        }
    }
}

// ── Loading & validation ──────────────────────────────────────────────────────

impl ClosedLoopConfig {
    /// Load from YAML file
    pub fn from_yaml(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| OmicsError::Config(format!("{path}: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from JSON file
    pub fn from_json(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| OmicsError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check thresholds and weights before any analysis runs.
    pub fn validate(&self) -> Result<()> {
        if !self.weights.validate() {
            return Err(OmicsError::Config(format!(
                "evidence weights must be non-negative and sum to 1.0 (got {:.6})",
                self.weights.sum()
            )));
        }
        if !(self.effect_size_threshold.is_finite() && self.effect_size_threshold > 0.0) {
            return Err(OmicsError::Config(
                "effect_size_threshold must be positive".to_string(),
            ));
        }
        for (name, value) in [
            ("p_value_threshold", self.p_value_threshold),
            ("causal_score_threshold", self.causal_score_threshold),
            ("similarity_threshold", self.similarity_threshold),
            ("background_mutation_rate", self.background_mutation_rate),
            ("selection.cnv_frequency_cutoff", self.selection.cnv_frequency_cutoff),
            ("selection.mutation_frequency_cutoff", self.selection.mutation_frequency_cutoff),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(OmicsError::Config(format!("{name} must lie in [0, 1], got {value}")));
            }
        }
        if self.background_mutation_rate <= 0.0 || self.background_mutation_rate >= 1.0 {
            return Err(OmicsError::Config(
                "background_mutation_rate must lie strictly between 0 and 1".to_string(),
            ));
        }
        let cnv_cutoff = self.selection.cnv_alteration_cutoff;
        if !(cnv_cutoff.is_finite() && cnv_cutoff >= 0.0) {
            return Err(OmicsError::Config(
                "selection.cnv_alteration_cutoff must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}
