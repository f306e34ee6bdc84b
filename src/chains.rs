//! Enumeration of producer/consumer paths between stages.

use std::collections::BTreeSet;
use std::fmt;

use fusion_workload::{StageId, WorkloadGraph};
use smallvec::SmallVec;

use crate::analyzer::DependencyAnalyzer;
use crate::errors::{AnalysisError, AnalysisResult};

/// A simple path `[src, .., dst]` where each stage writes a tensor read by
/// the next one. Never empty.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DependencyChain {
    stages: SmallVec<[StageId; 4]>,
}

impl DependencyChain {
    fn singleton(stage: StageId) -> Self {
        let mut stages = SmallVec::new();
        stages.push(stage);
        Self { stages }
    }

    fn extended(&self, stage: StageId) -> Self {
        let mut stages = self.stages.clone();
        stages.push(stage);
        Self { stages }
    }

    pub fn stages(&self) -> &[StageId] {
        &self.stages
    }

    pub fn source(&self) -> StageId {
        self.stages[0]
    }

    pub fn destination(&self) -> StageId {
        self.stages[self.stages.len() - 1]
    }

    pub fn contains(&self, stage: StageId) -> bool {
        self.stages.contains(&stage)
    }
}

impl fmt::Display for DependencyChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (k, stage) in self.stages.iter().enumerate() {
            if k > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{stage}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for DependencyChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{self}]")
    }
}

impl<'w, W: WorkloadGraph> DependencyAnalyzer<'w, W> {
    /// All simple producer/consumer paths from `src` to `dst`.
    ///
    /// Depth-first over an explicit stack of partial paths. When
    /// `src == dst` the trivial chain `[src]` comes first. A stage already on
    /// the path is never revisited, so cycles (including ones back to `src`)
    /// are not reported. The order is deterministic for a fixed graph.
    pub fn find_chains(&self, src: StageId, dst: StageId) -> AnalysisResult<Vec<DependencyChain>> {
        let mut chains = Vec::new();
        if src == dst {
            chains.push(DependencyChain::singleton(src));
        }

        let mut stack = vec![DependencyChain::singleton(src)];
        while let Some(path) = stack.pop() {
            for reader in self.successors(path.destination()) {
                if path.contains(reader) {
                    continue;
                }
                let extended = path.extended(reader);
                if self
                    .config
                    .max_chain_len
                    .is_some_and(|max| extended.stages.len() > max)
                {
                    tracing::debug!(chain = %extended, "pruning dependency chain at length limit");
                    continue;
                }

                if reader == dst {
                    tracing::trace!(chain = %extended, "found dependency chain");
                    chains.push(extended);
                    if let Some(limit) = self.config.max_chains
                        && chains.len() > limit
                    {
                        tracing::warn!(%src, %dst, limit, "dependency chain limit exceeded");
                        return Err(AnalysisError::chain_limit_exceeded(src, dst, limit));
                    }
                } else {
                    stack.push(extended);
                }
            }
        }

        tracing::debug!(%src, %dst, count = chains.len(), "enumerated dependency chains");
        Ok(chains)
    }

    /// Stages reading any tensor written by `stage`.
    fn successors(&self, stage: StageId) -> BTreeSet<StageId> {
        self.workload
            .tensors_written_by(stage)
            .iter()
            .flat_map(|&tensor| self.workload.reader_stages(tensor).iter().copied())
            .collect()
    }
}
