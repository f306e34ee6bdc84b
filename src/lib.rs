//! Dependency analysis for fused einsum workloads.
//!
//! Given a [`WorkloadGraph`], a [`DependencyAnalyzer`] answers:
//! - which producer/consumer chains connect two stages ([`DependencyAnalyzer::find_chains`]);
//! - which iteration dimensions of a stage determine the indices of a tensor,
//!   directly or through a chain of intermediate stages;
//! - which dimensions of different stages move in lockstep and can be tiled
//!   together.

pub mod analyzer;
pub mod chains;
pub mod config;
pub mod equivalence;
pub mod errors;
pub mod projection;
pub mod relevance;

pub use analyzer::{DependencyAnalyzer, DimensionSet};
pub use chains::DependencyChain;
pub use config::AnalyzerConfig;
pub use errors::{AnalysisError, AnalysisErrorKind, AnalysisResult};

pub use fusion_workload::{DimensionId, StageId, TensorId, WorkloadGraph};
