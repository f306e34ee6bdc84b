//! Dimension equivalence across fused stages.
//!
//! A dimension `d` of stage `S` is equivalent to dimension `e` of a
//! downstream stage `T` when, along some dependency chain from `S` to `T`,
//! the `S` iteration that feeds a `T` iteration has `d = e + c` for a
//! constant `c`. Fusion can then tile `d` and `e` together.

use std::collections::BTreeSet;
use std::sync::Arc;

use fusion_affine::{Aff, AffineRelation, DimType};
use fusion_workload::{DimensionId, StageId, WorkloadGraph};

use crate::analyzer::{DependencyAnalyzer, DimensionSet, cached};
use crate::errors::AnalysisResult;

impl<'w, W: WorkloadGraph> DependencyAnalyzer<'w, W> {
    /// The equivalence class of `dim`, which always contains `dim` itself.
    ///
    /// Every downstream stage (including `stage`) is searched through its
    /// projected iterations. The class is memoized for every member, so a
    /// later query on any of them returns the same set.
    pub fn equivalent_dimensions(
        &self,
        stage: StageId,
        dim: DimensionId,
    ) -> AnalysisResult<DimensionSet> {
        let idx = self.dim_index(stage, dim)?;
        if let Some(hit) = cached(&self.equivalent_memo, &dim) {
            return Ok(hit);
        }

        let mut class = BTreeSet::from([dim]);
        for &other in self.workload.stage_names().keys() {
            for (relation, dst) in self.projected_iterations(stage, other)? {
                if let Some(equivalent) = self.equivalent_in(&relation, idx, dst) {
                    class.insert(equivalent);
                }
            }
        }

        tracing::debug!(%stage, %dim, ?class, "equivalent dimensions");
        let class = Arc::new(class);
        for &member in class.iter() {
            self.equivalent_memo.insert(member, Arc::clone(&class));
        }
        Ok(class)
    }

    /// Every distinct equivalence class, visiting stages and dimensions in
    /// id order.
    pub fn equivalence_classes(&self) -> AnalysisResult<Vec<DimensionSet>> {
        let mut classes: Vec<DimensionSet> = Vec::new();
        for &stage in self.workload.stage_names().keys() {
            for &dim in self.workload.stage_dimensions(stage) {
                let class = self.equivalent_dimensions(stage, dim)?;
                if !classes.contains(&class) {
                    classes.push(class);
                }
            }
        }
        Ok(classes)
    }

    /// The dimension of `dst` that output `idx` of `relation` moves in
    /// lockstep with, if exactly one does.
    fn equivalent_in(&self, relation: &W::Relation, idx: usize, dst: StageId) -> Option<DimensionId> {
        if relation.n_basic_relations() != 1 {
            tracing::trace!(%dst, "skipping piecewise projected iterations");
            return None;
        }

        let n_out = relation.dim(DimType::Out);
        let mut projected = relation.clone();
        if idx + 1 < n_out {
            projected = projected.project_out(DimType::Out, idx + 1, n_out - idx - 1);
        }
        if idx > 0 {
            projected = projected.project_out(DimType::Out, 0, idx);
        }
        if !projected.is_single_valued() {
            return None;
        }

        let functions = projected.to_multi_pw_aff()?;
        assert_eq!(
            functions.size(),
            1,
            "projection onto output {idx} left {} components",
            functions.size()
        );
        let input = unit_coefficient(functions.get_at(0).as_aff()?)?;
        let equivalent = self
            .workload
            .idx_to_dim(dst, input)
            .unwrap_or_else(|| panic!("{dst} has no dimension at index {input}"));
        Some(equivalent)
    }
}

/// Index of the only input with coefficient 1, provided every other input
/// has coefficient 0.
fn unit_coefficient(aff: &Aff) -> Option<usize> {
    let mut found = None;
    for i in 0..aff.n_in() {
        if aff.coefficient_is(i, 1) {
            if found.is_some() {
                return None;
            }
            found = Some(i);
        } else if !aff.coefficient_is(i, 0) {
            return None;
        }
    }
    found
}
