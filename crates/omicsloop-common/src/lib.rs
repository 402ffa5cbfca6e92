//! omicsloop-common — Shared data model and errors used across all omicsloop crates.

pub mod error;
pub mod matrix;
pub mod clinical;
pub mod evidence;

// Re-export commonly used types
pub use error::{OmicsError, Result};
pub use matrix::NumericMatrix;
pub use clinical::{ClinicalRecord, ClinicalTable};
pub use evidence::{
    BiologicalContext, CausalGene, ConfidenceLevel, EvidenceScore, EvidenceType, GeneEvidence,
    ValidationStatus,
};
