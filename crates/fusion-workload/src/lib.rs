//! Fused einsum workloads.
//!
//! A fused workload is a set of stages (einsums) connected through tensors:
//! every tensor has at most one writer and any number of readers, and each
//! (stage, tensor) access is an affine relation from the stage's iteration
//! space to the tensor's index space.
//!
//! Analyses consume a workload through the read-only [`WorkloadGraph`]
//! trait. [`FusedWorkload`] is the in-memory implementation, built with
//! [`WorkloadBuilder`].

pub mod errors;
pub mod graph;
pub mod refs;
pub mod workload;

pub use errors::{WorkloadError, WorkloadResult};
pub use graph::WorkloadGraph;
pub use refs::{DimensionId, StageId, TensorId};
pub use workload::{FusedWorkload, WorkloadBuilder};

// Re-export so callers can construct handles with `EntityRef::new`.
pub use cranelift_entity::EntityRef;
