//! Evidence records and causal-gene records produced by the engine.
//!
//! Every record here is built once by the pipeline stage that owns it and
//! never mutated afterwards.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ── Evidence types ────────────────────────────────────────────────────────────

/// The five independent lines of causal evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceType {
    DifferentialExpression,
    SurvivalAssociation,
    CnvDriver,
    MethylationRegulation,
    MutationFrequency,
}

impl EvidenceType {
    /// All variants in canonical order. Weighted sums iterate in this order.
    pub const ALL: [EvidenceType; 5] = [
        EvidenceType::DifferentialExpression,
        EvidenceType::SurvivalAssociation,
        EvidenceType::CnvDriver,
        EvidenceType::MethylationRegulation,
        EvidenceType::MutationFrequency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceType::DifferentialExpression => "differential_expression",
            EvidenceType::SurvivalAssociation => "survival_association",
            EvidenceType::CnvDriver => "cnv_driver",
            EvidenceType::MethylationRegulation => "methylation_regulation",
            EvidenceType::MutationFrequency => "mutation_frequency",
        }
    }

    /// Prior weight used when the caller does not override it.
    pub fn default_weight(&self) -> f64 {
        match self {
            EvidenceType::DifferentialExpression => 0.25,
            EvidenceType::SurvivalAssociation => 0.25,
            EvidenceType::CnvDriver => 0.20,
            EvidenceType::MethylationRegulation => 0.20,
            EvidenceType::MutationFrequency => 0.10,
        }
    }
}

impl fmt::Display for EvidenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Per-gene evidence ─────────────────────────────────────────────────────────

/// One analyzer's verdict for one gene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceScore {
    pub gene_id: String,
    pub evidence_type: EvidenceType,
    /// Normalised evidence strength in [0, 1].
    pub score: f64,
    pub p_value: f64,
    /// Non-negative, analyzer-specific effect magnitude.
    pub effect_size: f64,
    pub confidence: f64,
    /// Analyzer diagnostics (group means, correlation, counts, ...).
    pub metadata: BTreeMap<String, f64>,
}

/// All evidence collected for a single gene, keyed by type.
pub type GeneEvidence = BTreeMap<EvidenceType, EvidenceScore>;

// ── Causal genes ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    /// `>= 0.8` High, `>= 0.6` Medium, otherwise Low.
    pub fn from_causal_score(score: f64) -> Self {
        if score >= 0.8 {
            ConfidenceLevel::High
        } else if score >= 0.6 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "High",
            ConfidenceLevel::Medium => "Medium",
            ConfidenceLevel::Low => "Low",
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-gene validation state. The engine only ever emits `Pending`;
/// downstream reviewers may record the other states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ValidationStatus {
    #[default]
    Pending,
    Validated,
    Rejected,
}

/// Summary statistics over a gene's evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiologicalContext {
    pub evidence_types: Vec<EvidenceType>,
    pub mean_p_value: f64,
    pub mean_effect_size: f64,
    /// Fraction of configured evidence types present for this gene.
    pub evidence_coverage: f64,
}

/// A gene that cleared the causal-score threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CausalGene {
    pub gene_id: String,
    pub causal_score: f64,
    pub evidence_scores: GeneEvidence,
    pub confidence_level: ConfidenceLevel,
    pub biological_context: BiologicalContext,
    /// Human-readable `"<type>: <score>"` lines in canonical type order.
    pub evidence_chain: Vec<String>,
    pub validation_status: ValidationStatus,
}
