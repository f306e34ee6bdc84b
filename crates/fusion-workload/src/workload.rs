//! In-memory fused workload and its builder.

use std::collections::{BTreeMap, BTreeSet};

use cranelift_entity::PrimaryMap;
use fusion_affine::{AffineRelation, DimType, IslMap};

use crate::errors::{WorkloadError, WorkloadResult};
use crate::graph::WorkloadGraph;
use crate::refs::{DimensionId, StageId, TensorId};

struct StageData<R: AffineRelation> {
    dims: Vec<DimensionId>,
    dim_to_idx: BTreeMap<DimensionId, usize>,
    space: R::Space,
    reads: BTreeSet<TensorId>,
    writes: BTreeSet<TensorId>,
}

struct TensorData {
    name: String,
    rank: usize,
    readers: BTreeSet<StageId>,
    writer: Option<StageId>,
}

struct DimensionData {
    name: String,
    stage: StageId,
}

/// A fused workload: stages, tensors, and the access relation of every
/// (stage, tensor) pair where the stage reads or writes the tensor.
///
/// Immutable once built; use [`WorkloadBuilder`] to create one.
pub struct FusedWorkload<R: AffineRelation = IslMap> {
    stages: PrimaryMap<StageId, StageData<R>>,
    tensors: PrimaryMap<TensorId, TensorData>,
    dims: PrimaryMap<DimensionId, DimensionData>,
    stage_names: BTreeMap<StageId, String>,
    accesses: BTreeMap<(StageId, TensorId), R>,
}

impl<R: AffineRelation> FusedWorkload<R> {
    fn new() -> Self {
        Self {
            stages: PrimaryMap::new(),
            tensors: PrimaryMap::new(),
            dims: PrimaryMap::new(),
            stage_names: BTreeMap::new(),
            accesses: BTreeMap::new(),
        }
    }

    pub fn stages(&self) -> impl Iterator<Item = StageId> + '_ {
        self.stages.keys()
    }

    pub fn tensors(&self) -> impl Iterator<Item = TensorId> + '_ {
        self.tensors.keys()
    }

    pub fn stage_name(&self, stage: StageId) -> &str {
        &self.stage_names[&stage]
    }

    pub fn tensor_name(&self, tensor: TensorId) -> &str {
        &self.tensors[tensor].name
    }

    pub fn tensor_rank(&self, tensor: TensorId) -> usize {
        self.tensors[tensor].rank
    }

    pub fn dimension_name(&self, dim: DimensionId) -> &str {
        &self.dims[dim].name
    }

    /// The stage whose iteration space contains `dim`.
    pub fn dimension_stage(&self, dim: DimensionId) -> StageId {
        self.dims[dim].stage
    }

    pub fn stage_by_name(&self, name: &str) -> Option<StageId> {
        self.stage_names
            .iter()
            .find_map(|(&id, n)| (n == name).then_some(id))
    }

    pub fn tensor_by_name(&self, name: &str) -> Option<TensorId> {
        self.tensors
            .iter()
            .find_map(|(id, t)| (t.name == name).then_some(id))
    }

    pub fn dimension_by_name(&self, stage: StageId, name: &str) -> Option<DimensionId> {
        self.stages[stage]
            .dims
            .iter()
            .copied()
            .find(|&dim| self.dims[dim].name == name)
    }
}

impl<R: AffineRelation> WorkloadGraph for FusedWorkload<R> {
    type Relation = R;

    fn stage_names(&self) -> &BTreeMap<StageId, String> {
        &self.stage_names
    }

    fn tensors_read_by(&self, stage: StageId) -> &BTreeSet<TensorId> {
        &self.stages[stage].reads
    }

    fn tensors_written_by(&self, stage: StageId) -> &BTreeSet<TensorId> {
        &self.stages[stage].writes
    }

    fn reader_stages(&self, tensor: TensorId) -> &BTreeSet<StageId> {
        &self.tensors[tensor].readers
    }

    fn writer_stage(&self, tensor: TensorId) -> Option<StageId> {
        self.tensors[tensor].writer
    }

    fn stage_dimensions(&self, stage: StageId) -> &[DimensionId] {
        &self.stages[stage].dims
    }

    fn stage_space(&self, stage: StageId) -> &R::Space {
        &self.stages[stage].space
    }

    fn dim_to_idx(&self, stage: StageId) -> &BTreeMap<DimensionId, usize> {
        &self.stages[stage].dim_to_idx
    }

    fn accesses(&self, stage: StageId, tensor: TensorId) -> Option<&R> {
        self.accesses.get(&(stage, tensor))
    }
}

/// Incrementally builds a [`FusedWorkload`], validating each step.
pub struct WorkloadBuilder<R: AffineRelation = IslMap> {
    workload: FusedWorkload<R>,
}

impl<R: AffineRelation> Default for WorkloadBuilder<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: AffineRelation> WorkloadBuilder<R> {
    pub fn new() -> Self {
        Self {
            workload: FusedWorkload::new(),
        }
    }

    /// Declare a tensor with `rank` index dimensions.
    pub fn tensor(&mut self, name: impl Into<String>, rank: usize) -> WorkloadResult<TensorId> {
        let name = name.into();
        if self.workload.tensor_by_name(&name).is_some() {
            return Err(WorkloadError::DuplicateName(name));
        }
        Ok(self.workload.tensors.push(TensorData {
            name,
            rank,
            readers: BTreeSet::new(),
            writer: None,
        }))
    }

    /// Declare a stage with one iteration dimension per name, bounded by
    /// `space`.
    pub fn stage<S: Into<String>>(
        &mut self,
        name: impl Into<String>,
        space: R::Space,
        dim_names: impl IntoIterator<Item = S>,
    ) -> WorkloadResult<StageId> {
        let name = name.into();
        if self.workload.stage_by_name(&name).is_some() {
            return Err(WorkloadError::DuplicateName(name));
        }
        let dim_names: Vec<String> = dim_names.into_iter().map(Into::into).collect();
        let space_rank = R::identity(&space).dim(DimType::In);
        if space_rank != dim_names.len() {
            return Err(WorkloadError::SpaceRank {
                name,
                space_rank,
                n_dims: dim_names.len(),
            });
        }

        let stage = self.workload.stages.next_key();
        let dims: Vec<DimensionId> = dim_names
            .into_iter()
            .map(|name| self.workload.dims.push(DimensionData { name, stage }))
            .collect();
        let dim_to_idx = dims.iter().enumerate().map(|(idx, &d)| (d, idx)).collect();
        self.workload.stages.push(StageData {
            dims,
            dim_to_idx,
            space,
            reads: BTreeSet::new(),
            writes: BTreeSet::new(),
        });
        self.workload.stage_names.insert(stage, name);
        Ok(stage)
    }

    /// Iteration dimensions of a declared stage, in index order.
    pub fn dims(&self, stage: StageId) -> &[DimensionId] {
        &self.workload.stages[stage].dims
    }

    /// Record that `stage` reads `tensor` through `relation`.
    pub fn read(&mut self, stage: StageId, tensor: TensorId, relation: R) -> WorkloadResult<()> {
        self.add_access(stage, tensor, relation)?;
        self.workload.stages[stage].reads.insert(tensor);
        self.workload.tensors[tensor].readers.insert(stage);
        Ok(())
    }

    /// Record that `stage` writes `tensor` through `relation`.
    pub fn write(&mut self, stage: StageId, tensor: TensorId, relation: R) -> WorkloadResult<()> {
        if let Some(existing) = self.workload.tensors[tensor].writer {
            return Err(WorkloadError::DuplicateWriter {
                tensor,
                existing,
                stage,
            });
        }
        self.add_access(stage, tensor, relation)?;
        self.workload.stages[stage].writes.insert(tensor);
        self.workload.tensors[tensor].writer = Some(stage);
        Ok(())
    }

    fn add_access(&mut self, stage: StageId, tensor: TensorId, relation: R) -> WorkloadResult<()> {
        if self.workload.accesses.contains_key(&(stage, tensor)) {
            return Err(WorkloadError::DuplicateAccess { stage, tensor });
        }
        let expected_in = self.workload.stages[stage].dims.len();
        let expected_out = self.workload.tensors[tensor].rank;
        let (found_in, found_out) = (relation.dim(DimType::In), relation.dim(DimType::Out));
        if (found_in, found_out) != (expected_in, expected_out) {
            return Err(WorkloadError::AccessArity {
                stage,
                tensor,
                found_in,
                found_out,
                expected_in,
                expected_out,
            });
        }
        self.workload.accesses.insert((stage, tensor), relation);
        Ok(())
    }

    /// Finish construction. Every stage must write at least one tensor.
    pub fn build(self) -> WorkloadResult<FusedWorkload<R>> {
        if let Some(stage) = self
            .workload
            .stages
            .iter()
            .find_map(|(id, s)| s.writes.is_empty().then_some(id))
        {
            return Err(WorkloadError::NoOutputs { stage });
        }
        tracing::debug!(
            stages = self.workload.stages.len(),
            tensors = self.workload.tensors.len(),
            accesses = self.workload.accesses.len(),
            "built fused workload"
        );
        Ok(self.workload)
    }
}
