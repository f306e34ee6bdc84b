//! Which iteration dimensions of a stage influence the indices of a tensor.

use std::collections::BTreeSet;
use std::sync::Arc;

use fusion_affine::{AffineRelation, DimType};
use fusion_workload::{DimensionId, StageId, TensorId, WorkloadGraph};

use crate::analyzer::{DependencyAnalyzer, DimensionSet, cached};
use crate::errors::AnalysisResult;

impl<'w, W: WorkloadGraph> DependencyAnalyzer<'w, W> {
    /// Whether `dim` appears in `stage`'s own access to `tensor`.
    ///
    /// False when `stage` does not access `tensor` at all.
    pub fn is_directly_relevant(
        &self,
        stage: StageId,
        dim: DimensionId,
        tensor: TensorId,
    ) -> AnalysisResult<bool> {
        if !self.workload.reads(stage, tensor) && !self.workload.writes(stage, tensor) {
            return Ok(false);
        }
        let idx = self.dim_index(stage, dim)?;
        Ok(self
            .access(stage, tensor)
            .involves_dims(DimType::In, idx, 1))
    }

    pub fn directly_relevant_dimensions(
        &self,
        stage: StageId,
        tensor: TensorId,
    ) -> AnalysisResult<DimensionSet> {
        let key = (stage, tensor);
        if let Some(hit) = cached(&self.directly_relevant_memo, &key) {
            return Ok(hit);
        }

        let mut relevant = BTreeSet::new();
        for &dim in self.workload.stage_dimensions(stage) {
            if self.is_directly_relevant(stage, dim, tensor)? {
                relevant.insert(dim);
            }
        }
        let relevant = Arc::new(relevant);
        self.directly_relevant_memo
            .insert(key, Arc::clone(&relevant));
        Ok(relevant)
    }

    /// Whether `dim` influences which elements of `tensor` are touched on
    /// any dependency chain leading to `stage`.
    pub fn is_relevant(
        &self,
        stage: StageId,
        dim: DimensionId,
        tensor: TensorId,
    ) -> AnalysisResult<bool> {
        let idx = self.dim_index(stage, dim)?;
        let projected = self.projected_accesses(stage, tensor)?;
        Ok(involves_input(&projected, idx))
    }

    pub fn relevant_dimensions(
        &self,
        stage: StageId,
        tensor: TensorId,
    ) -> AnalysisResult<DimensionSet> {
        let key = (stage, tensor);
        if let Some(hit) = cached(&self.relevant_memo, &key) {
            return Ok(hit);
        }

        let projected = self.projected_accesses(stage, tensor)?;
        let mut relevant = BTreeSet::new();
        for &dim in self.workload.stage_dimensions(stage) {
            if involves_input(&projected, self.dim_index(stage, dim)?) {
                relevant.insert(dim);
            }
        }
        tracing::trace!(%stage, %tensor, ?relevant, "relevant dimensions");
        let relevant = Arc::new(relevant);
        self.relevant_memo.insert(key, Arc::clone(&relevant));
        Ok(relevant)
    }
}

fn involves_input<R: AffineRelation>(relations: &[R], idx: usize) -> bool {
    relations
        .iter()
        .any(|relation| relation.involves_dims(DimType::In, idx, 1))
}

#[cfg(test)]
mod tests {
    use fusion_affine::{Context, IslMap, IslSet};
    use fusion_workload::{FusedWorkload, WorkloadBuilder};

    use super::*;
    use crate::errors::AnalysisErrorKind;

    /// S[i, k] reads A[i] and writes B[i, k].
    fn broadcast() -> (FusedWorkload, StageId, [DimensionId; 2], TensorId, TensorId) {
        let ctx = Arc::new(Context::alloc());
        let mut b = WorkloadBuilder::new();
        let a = b.tensor("A", 1).unwrap();
        let out = b.tensor("B", 2).unwrap();
        let space = IslSet::parse(&ctx, "{ [i, k] : 0 <= i < 4 and 0 <= k < 4 }");
        let s = b.stage("S", space, ["i", "k"]).unwrap();
        let dims = [b.dims(s)[0], b.dims(s)[1]];
        b.read(s, a, IslMap::parse(&ctx, "{ [i, k] -> [i] }")).unwrap();
        b.write(s, out, IslMap::parse(&ctx, "{ [i, k] -> [i, k] }"))
            .unwrap();
        (b.build().unwrap(), s, dims, a, out)
    }

    #[test]
    fn direct_relevance_follows_the_access() {
        let (w, s, [i, k], a, out) = broadcast();
        let analyzer = DependencyAnalyzer::new(&w);
        assert!(analyzer.is_directly_relevant(s, i, a).unwrap());
        assert!(!analyzer.is_directly_relevant(s, k, a).unwrap());
        assert_eq!(
            *analyzer.directly_relevant_dimensions(s, out).unwrap(),
            BTreeSet::from([i, k])
        );
    }

    #[test]
    fn direct_relevance_is_memoized() {
        let (w, s, _, a, _) = broadcast();
        let analyzer = DependencyAnalyzer::new(&w);
        let first = analyzer.directly_relevant_dimensions(s, a).unwrap();
        let second = analyzer.directly_relevant_dimensions(s, a).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn unknown_dimension_is_an_error() {
        let (w, s, _, a, _) = broadcast();
        let analyzer = DependencyAnalyzer::new(&w);
        let foreign = DimensionId::from_u32(99);
        let err = analyzer.is_relevant(s, foreign, a).unwrap_err();
        assert_eq!(
            err.kind(),
            &AnalysisErrorKind::UnknownDimension {
                stage: s,
                dim: foreign
            }
        );
    }

    #[test]
    fn relevance_of_own_access_matches_direct() {
        let (w, s, [i, k], a, _) = broadcast();
        let analyzer = DependencyAnalyzer::new(&w);
        assert!(analyzer.is_relevant(s, i, a).unwrap());
        assert!(!analyzer.is_relevant(s, k, a).unwrap());
        assert_eq!(
            analyzer.relevant_dimensions(s, a).unwrap(),
            analyzer.directly_relevant_dimensions(s, a).unwrap()
        );
    }
}
