//! The dependency analyzer and its memoization state.
//!
//! Queries are split across modules by concern (`chains`, `relevance`,
//! `projection`, `equivalence`); each adds methods to [`DependencyAnalyzer`].

use std::collections::BTreeSet;
use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;
use fusion_workload::{DimensionId, StageId, TensorId, WorkloadGraph};

use crate::config::AnalyzerConfig;
use crate::errors::{AnalysisError, AnalysisResult};

/// An immutable set of dimensions, shared between cache entries and callers.
pub type DimensionSet = Arc<BTreeSet<DimensionId>>;

/// Read-only dependency analysis over a fused workload.
///
/// Results of the relevance and equivalence queries are memoized for the
/// analyzer's lifetime; the workload must not change while it is borrowed.
/// Each cache is an independent concurrent map and no lock is held while a
/// result is computed, so a lost race only costs a recomputation.
pub struct DependencyAnalyzer<'w, W: WorkloadGraph> {
    pub(crate) workload: &'w W,
    pub(crate) config: AnalyzerConfig,
    pub(crate) directly_relevant_memo: DashMap<(StageId, TensorId), DimensionSet>,
    pub(crate) relevant_memo: DashMap<(StageId, TensorId), DimensionSet>,
    pub(crate) equivalent_memo: DashMap<DimensionId, DimensionSet>,
}

impl<'w, W: WorkloadGraph> DependencyAnalyzer<'w, W> {
    pub fn new(workload: &'w W) -> Self {
        Self::with_config(workload, AnalyzerConfig::default())
    }

    pub fn with_config(workload: &'w W, config: AnalyzerConfig) -> Self {
        Self {
            workload,
            config,
            directly_relevant_memo: DashMap::new(),
            relevant_memo: DashMap::new(),
            equivalent_memo: DashMap::new(),
        }
    }

    pub fn workload(&self) -> &'w W {
        self.workload
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Dense index of `dim` within `stage`'s iteration space.
    pub(crate) fn dim_index(&self, stage: StageId, dim: DimensionId) -> AnalysisResult<usize> {
        self.workload
            .dim_to_idx(stage)
            .get(&dim)
            .copied()
            .ok_or_else(|| AnalysisError::unknown_dimension(stage, dim))
    }

    /// Access relation of a (stage, tensor) pair the graph connects.
    pub(crate) fn access(&self, stage: StageId, tensor: TensorId) -> &'w W::Relation {
        self.workload
            .accesses(stage, tensor)
            .unwrap_or_else(|| panic!("{stage} accesses {tensor} but has no access relation"))
    }
}

pub(crate) fn cached<K: Eq + Hash>(memo: &DashMap<K, DimensionSet>, key: &K) -> Option<DimensionSet> {
    memo.get(key).map(|entry| Arc::clone(entry.value()))
}
