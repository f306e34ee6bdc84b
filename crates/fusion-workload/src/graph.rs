//! Read-only queries over a fused workload.

use std::collections::{BTreeMap, BTreeSet};

use fusion_affine::AffineRelation;

use crate::refs::{DimensionId, StageId, TensorId};

/// The producer/consumer graph of a fused workload, as seen by analyses.
///
/// Implementations guarantee:
/// - every tensor has at most one writer stage;
/// - `tensors_written_by(s)` is non-empty and `s` is the writer of each of
///   its tensors;
/// - `accesses(s, t)` is `Some` exactly when `s` reads or writes `t`;
/// - the dense dimension index of a stage is stable for the graph's lifetime.
///
/// Lookups with a handle that does not belong to the graph panic.
pub trait WorkloadGraph {
    /// Affine relation engine used for access functions.
    type Relation: AffineRelation;

    /// Every stage with its display name, in id order.
    fn stage_names(&self) -> &BTreeMap<StageId, String>;

    fn tensors_read_by(&self, stage: StageId) -> &BTreeSet<TensorId>;

    fn tensors_written_by(&self, stage: StageId) -> &BTreeSet<TensorId>;

    fn reader_stages(&self, tensor: TensorId) -> &BTreeSet<StageId>;

    fn writer_stage(&self, tensor: TensorId) -> Option<StageId>;

    /// Iteration dimensions of a stage, in dense index order.
    fn stage_dimensions(&self, stage: StageId) -> &[DimensionId];

    /// Bounds of the stage's iteration space.
    fn stage_space(&self, stage: StageId) -> &<Self::Relation as AffineRelation>::Space;

    fn dim_to_idx(&self, stage: StageId) -> &BTreeMap<DimensionId, usize>;

    fn idx_to_dim(&self, stage: StageId, idx: usize) -> Option<DimensionId> {
        self.stage_dimensions(stage).get(idx).copied()
    }

    /// Access relation from the stage's iteration space to the tensor's
    /// index space.
    fn accesses(&self, stage: StageId, tensor: TensorId) -> Option<&Self::Relation>;

    fn reads(&self, stage: StageId, tensor: TensorId) -> bool {
        self.tensors_read_by(stage).contains(&tensor)
    }

    fn writes(&self, stage: StageId, tensor: TensorId) -> bool {
        self.tensors_written_by(stage).contains(&tensor)
    }
}
