//! Error types for dependency analysis queries.

use derive_more::{Display, From};
use fusion_workload::{DimensionId, StageId, TensorId};

pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[derive(Clone, Display, Debug, From, PartialEq, Eq)]
#[display("{kind}")]
pub struct AnalysisError {
    #[from]
    kind: Box<AnalysisErrorKind>,
}

impl<E> From<E> for AnalysisError
where
    AnalysisErrorKind: From<E>,
{
    fn from(error: E) -> Self {
        AnalysisError {
            kind: Box::new(AnalysisErrorKind::from(error)),
        }
    }
}

impl AnalysisError {
    pub(crate) fn invalid_query(stage: StageId, tensor: TensorId) -> Self {
        AnalysisErrorKind::InvalidQuery { stage, tensor }.into()
    }

    pub(crate) fn unknown_dimension(stage: StageId, dim: DimensionId) -> Self {
        AnalysisErrorKind::UnknownDimension { stage, dim }.into()
    }

    pub(crate) fn chain_limit_exceeded(src: StageId, dst: StageId, limit: usize) -> Self {
        AnalysisErrorKind::ChainLimitExceeded { src, dst, limit }.into()
    }

    pub fn kind(&self) -> &AnalysisErrorKind {
        &self.kind
    }
}

#[derive(Clone, Display, Debug, PartialEq, Eq)]
pub enum AnalysisErrorKind {
    /// No stage reads or writes the tensor, so nothing can explain its
    /// relevance to the queried stage.
    #[display("invalid query: no source stage for {tensor} as seen from {stage}")]
    InvalidQuery { stage: StageId, tensor: TensorId },

    #[display("{dim} is not an iteration dimension of {stage}")]
    UnknownDimension { stage: StageId, dim: DimensionId },

    #[display("more than {limit} dependency chains from {src} to {dst}")]
    ChainLimitExceeded {
        src: StageId,
        dst: StageId,
        limit: usize,
    },
}

impl std::error::Error for AnalysisError {}
