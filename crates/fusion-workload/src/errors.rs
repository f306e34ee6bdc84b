//! Error types for workload construction.

use derive_more::Display;

use crate::refs::{StageId, TensorId};

pub type WorkloadResult<T> = Result<T, WorkloadError>;

#[derive(Clone, Debug, Display, PartialEq, Eq)]
pub enum WorkloadError {
    #[display("{tensor} is already written by {existing}, {stage} cannot also write it")]
    DuplicateWriter {
        tensor: TensorId,
        existing: StageId,
        stage: StageId,
    },

    #[display("{stage} already accesses {tensor}")]
    DuplicateAccess { stage: StageId, tensor: TensorId },

    #[display(
        "access of {tensor} by {stage} is [{found_in}] -> [{found_out}], \
         expected [{expected_in}] -> [{expected_out}]"
    )]
    AccessArity {
        stage: StageId,
        tensor: TensorId,
        found_in: usize,
        found_out: usize,
        expected_in: usize,
        expected_out: usize,
    },

    #[display("iteration space of `{name}` has rank {space_rank} but {n_dims} dimensions are named")]
    SpaceRank {
        name: String,
        space_rank: usize,
        n_dims: usize,
    },

    #[display("{stage} writes no tensor")]
    NoOutputs { stage: StageId },

    #[display("duplicate name `{_0}`")]
    DuplicateName(String),
}

impl std::error::Error for WorkloadError {}
