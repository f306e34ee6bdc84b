//! Typed handles for workload entities.
//!
//! Each handle is a thin `u32` wrapper providing type-safe indexing into the
//! `PrimaryMap` storage of a `FusedWorkload`. The three kinds cannot be
//! mixed up even though all are integers underneath.

use cranelift_entity::entity_impl;

/// A computational stage (einsum) of the fused workload.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StageId(u32);
entity_impl!(StageId, "einsum");

/// A tensor (data space) shared between a writer and its readers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TensorId(u32);
entity_impl!(TensorId, "dspace");

/// One iteration dimension of exactly one stage.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DimensionId(u32);
entity_impl!(DimensionId, "dim");
