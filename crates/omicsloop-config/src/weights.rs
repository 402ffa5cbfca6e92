//! Evidence weight vector for causal scoring.

use serde::{Deserialize, Serialize};

use omicsloop_common::EvidenceType;

/// The 5-component evidence weight vector.
/// Weights sum to 1.0; a zero weight switches that evidence type off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceWeights {
    /// Tumour-like vs. normal-like expression split (t-test)
    #[serde(default = "default_de_weight")]
    pub differential_expression: f64,
    /// Expression-dichotomised log-rank / proportional hazards
    #[serde(default = "default_survival_weight")]
    pub survival_association: f64,
    /// Copy-number vs. expression correlation
    #[serde(default = "default_cnv_weight")]
    pub cnv_driver: f64,
    /// Methylation vs. expression anti-correlation
    #[serde(default = "default_methylation_weight")]
    pub methylation_regulation: f64,
    /// Binomial excess over background mutation rate
    #[serde(default = "default_mutation_weight")]
    pub mutation_frequency: f64,
}

fn default_de_weight() -> f64 { EvidenceType::DifferentialExpression.default_weight() }
fn default_survival_weight() -> f64 { EvidenceType::SurvivalAssociation.default_weight() }
fn default_cnv_weight() -> f64 { EvidenceType::CnvDriver.default_weight() }
fn default_methylation_weight() -> f64 { EvidenceType::MethylationRegulation.default_weight() }
fn default_mutation_weight() -> f64 { EvidenceType::MutationFrequency.default_weight() }

impl Default for EvidenceWeights {
    fn default() -> Self {
        Self {
            differential_expression: default_de_weight(),
            survival_association:    default_survival_weight(),
            cnv_driver:              default_cnv_weight(),
            methylation_regulation:  default_methylation_weight(),
            mutation_frequency:      default_mutation_weight(),
        }
    }
}

impl EvidenceWeights {
    pub fn get(&self, evidence_type: EvidenceType) -> f64 {
        match evidence_type {
            EvidenceType::DifferentialExpression => self.differential_expression,
            EvidenceType::SurvivalAssociation    => self.survival_association,
            EvidenceType::CnvDriver              => self.cnv_driver,
            EvidenceType::MethylationRegulation  => self.methylation_regulation,
            EvidenceType::MutationFrequency      => self.mutation_frequency,
        }
    }

    /// Evidence types with a positive weight, in canonical order.
    pub fn configured_types(&self) -> Vec<EvidenceType> {
        EvidenceType::ALL
            .into_iter()
            .filter(|t| self.get(*t) > 0.0)
            .collect()
    }

    pub fn sum(&self) -> f64 {
        self.as_array().iter().sum()
    }

    /// Validate that all weights are non-negative and sum to ~1.0
    pub fn validate(&self) -> bool {
        self.as_array().iter().all(|w| w.is_finite() && *w >= 0.0)
            && (self.sum() - 1.0).abs() < 1e-6
    }

    /// Renormalise weights so they sum to 1.0
    pub fn normalise(&mut self) {
        let sum = self.sum();
        if sum > 0.0 {
            self.differential_expression /= sum;
            self.survival_association    /= sum;
            self.cnv_driver              /= sum;
            self.methylation_regulation  /= sum;
            self.mutation_frequency      /= sum;
        }
    }

    /// Convert to array for iteration, in `EvidenceType::ALL` order.
    pub fn as_array(&self) -> [f64; 5] {
        [
            self.differential_expression,
            self.survival_association,
            self.cnv_driver,
            self.methylation_regulation,
            self.mutation_frequency,
        ]
    }
}
