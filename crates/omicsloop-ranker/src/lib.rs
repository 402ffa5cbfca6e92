//! omicsloop-ranker — Evidence integration and causal scoring engine.
//!
//! Five independent analyzers score candidate genes on a shared [0, 1]
//! scale; the scorer combines them into a causal score, and the top genes
//! are linked into an evidence-similarity network and summarised.

pub mod stats;
pub mod normalise;
pub mod analyzers;
pub mod selector;
pub mod scorer;
pub mod network;
pub mod validation;
pub mod pathway;
pub mod result;
pub mod orchestrator;

pub use analyzers::survival::{SurvivalCohort, SurvivalSource};
pub use network::{EvidenceNetwork, NetworkEdge, NetworkNode};
pub use orchestrator::{CancelFlag, ClosedLoopOrchestrator, CohortInputs, PhaseHook};
pub use pathway::PathwaySummary;
pub use result::{AlgorithmStats, ClosedLoopResult, Phase};
pub use validation::ValidationMetrics;
