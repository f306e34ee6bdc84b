//! Composition of access relations along dependency chains.
//!
//! Walking a chain `[s0, s1, .., sn]` starts from a relation whose domain is
//! the iteration space of `s0`. Each producer/consumer hop `(p, c)` through
//! the intermediate tensor `t` rewrites the domain from `p`'s iteration
//! space to `c`'s: first backwards through `p`'s write of `t`, then forwards
//! through `c`'s read of `t`. The result has `sn`'s iteration space as its
//! domain.

use std::collections::BTreeSet;

use fusion_affine::AffineRelation;
use fusion_workload::{StageId, TensorId, WorkloadGraph};

use crate::analyzer::DependencyAnalyzer;
use crate::chains::DependencyChain;
use crate::errors::{AnalysisError, AnalysisResult};

impl<'w, W: WorkloadGraph> DependencyAnalyzer<'w, W> {
    /// How `stage`'s iterations map onto `tensor`, through every chain from a
    /// stage that touches `tensor` to `stage`.
    ///
    /// If `stage` accesses `tensor` itself, the only source is `stage` and the
    /// result is its own access relation. Otherwise the sources are the
    /// tensor's readers, or its writer when nobody reads it. One relation is
    /// returned per chain; sources with no chain to `stage` contribute none.
    pub fn projected_accesses(&self, stage: StageId, tensor: TensorId) -> AnalysisResult<Vec<W::Relation>> {
        let sources = self.access_sources(stage, tensor);
        if sources.is_empty() {
            tracing::warn!(%stage, %tensor, "tensor has neither readers nor a writer");
            return Err(AnalysisError::invalid_query(stage, tensor));
        }

        let mut projected = Vec::new();
        for &source in &sources {
            let access = self.access(source, tensor);
            for chain in self.find_chains(source, stage)? {
                projected.push(self.walk_chain(&chain, access.clone()));
            }
        }
        tracing::debug!(
            %stage,
            %tensor,
            ?sources,
            relations = projected.len(),
            "projected accesses"
        );
        Ok(projected)
    }

    /// For each chain from `src` to `dst`, the relation from `dst`'s
    /// iterations to the `src` iterations they depend on, paired with `dst`.
    pub fn projected_iterations(
        &self,
        src: StageId,
        dst: StageId,
    ) -> AnalysisResult<Vec<(W::Relation, StageId)>> {
        let identity = W::Relation::identity(self.workload.stage_space(src));
        let chains = self.find_chains(src, dst)?;
        Ok(chains
            .iter()
            .map(|chain| (self.walk_chain(chain, identity.clone()), chain.destination()))
            .collect())
    }

    fn access_sources(&self, stage: StageId, tensor: TensorId) -> BTreeSet<StageId> {
        let workload = self.workload;
        if workload.reads(stage, tensor) || workload.writes(stage, tensor) {
            return BTreeSet::from([stage]);
        }
        let readers = workload.reader_stages(tensor);
        if !readers.is_empty() {
            return readers.clone();
        }
        workload.writer_stage(tensor).into_iter().collect()
    }

    fn walk_chain(&self, chain: &DependencyChain, start: W::Relation) -> W::Relation {
        let mut relation = start;
        for hop in chain.stages().windows(2) {
            let (producer, consumer) = (hop[0], hop[1]);
            let intermediate = self.intermediate_tensor(producer, consumer);
            relation = self
                .access(producer, intermediate)
                .reverse()
                .apply_range(&relation);
            relation = self.access(consumer, intermediate).apply_range(&relation);
        }
        relation
    }

    /// First tensor, in id order, written by `producer` and read by `consumer`.
    fn intermediate_tensor(&self, producer: StageId, consumer: StageId) -> TensorId {
        self.workload
            .tensors_written_by(producer)
            .iter()
            .copied()
            .find(|&tensor| self.workload.reads(consumer, tensor))
            .unwrap_or_else(|| panic!("{producer} -> {consumer} is not a producer/consumer edge"))
    }
}
