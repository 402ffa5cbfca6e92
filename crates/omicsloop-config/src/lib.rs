//! omicsloop-config — Analysis configuration: thresholds, evidence weights and loaders.

pub mod weights;
pub mod closed_loop;

pub use weights::EvidenceWeights;
pub use closed_loop::{ClosedLoopConfig, SelectionConfig};
