//! Piecewise-affine integer relations.
//!
//! Access functions of a fused workload map iteration points of a stage to
//! index points of a tensor. Dependency analysis composes, reverses and
//! projects these maps, then inspects the affine functions they denote.
//!
//! The analysis only talks to the [`AffineRelation`] trait, so the engine
//! behind it can be replaced (or mocked) without touching the analysis.
//! [`IslMap`] is the engine shipped with this crate, a thin wrapper over isl
//! maps. Projections are exact over the integers: strides survive as
//! existentially quantified divisibility constraints.

use std::fmt;

pub mod aff;
pub mod isl;

pub use aff::{Aff, MultiPwAff, PwAff};
pub use isl::{IslMap, IslSet};

// Re-export so callers can create the context relations live in.
pub use isl_rs::Context;

/// Which side of a relation a dimension lives on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DimType {
    /// Domain dimensions.
    In,
    /// Range dimensions.
    Out,
}

/// Operations the dependency analysis needs from an affine relation engine.
pub trait AffineRelation: Clone + fmt::Debug + fmt::Display {
    /// Bounding description of an iteration space; only its shape matters.
    type Space;

    /// Identity relation over `space`.
    fn identity(space: &Self::Space) -> Self;

    /// Compose `self: A -> B` with `next: B -> C` into `A -> C`.
    ///
    /// # Panics
    ///
    /// Panics if the range of `self` and the domain of `next` differ in arity.
    fn apply_range(&self, next: &Self) -> Self;

    /// Swap domain and range.
    fn reverse(&self) -> Self;

    /// Number of dimensions on one side.
    fn dim(&self, ty: DimType) -> usize;

    /// Existentially project out `n` dimensions of `ty` starting at `first`.
    fn project_out(&self, ty: DimType, first: usize, n: usize) -> Self;

    /// Whether every domain point maps to at most one range point.
    fn is_single_valued(&self) -> bool;

    /// Whether any constraint mentions a dimension in `first..first + n`.
    fn involves_dims(&self, ty: DimType, first: usize, n: usize) -> bool;

    /// Number of basic (convex) relations in the union.
    fn n_basic_relations(&self) -> usize;

    /// Decompose a single-valued relation into one piecewise-affine function
    /// per output dimension. Returns `None` when the relation is not
    /// single-valued.
    fn to_multi_pw_aff(&self) -> Option<MultiPwAff>;
}
