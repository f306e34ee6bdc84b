//! [`AffineRelation`] backed by isl maps.
//!
//! Every handle keeps the isl context it was created in alive. isl contexts
//! are not thread-safe, so neither are these handles.

use std::fmt;
use std::sync::Arc;

use isl_rs::{Context, Map, PwMultiAff, Set, Val};

use crate::aff::{Aff, MultiPwAff, PwAff};
use crate::{AffineRelation, DimType};

fn isl_dim_type(ty: DimType) -> isl_rs::DimType {
    match ty {
        DimType::In => isl_rs::DimType::In,
        DimType::Out => isl_rs::DimType::Out,
    }
}

/// A bounded iteration space, e.g. `{ [i, k] : 0 <= i < 8 and 0 <= k < 4 }`.
pub struct IslSet {
    // Declared before `ctx` so the set is freed first.
    set: Set,
    ctx: Arc<Context>,
}

impl IslSet {
    /// Parse a set in isl notation.
    pub fn parse(ctx: &Arc<Context>, text: &str) -> Self {
        Self {
            set: Set::read_from_str(ctx, text),
            ctx: Arc::clone(ctx),
        }
    }

    pub fn rank(&self) -> usize {
        self.set.dim(isl_rs::DimType::Set) as usize
    }

    pub fn set(&self) -> &Set {
        &self.set
    }
}

impl Clone for IslSet {
    fn clone(&self) -> Self {
        Self {
            set: self.set.copy(),
            ctx: Arc::clone(&self.ctx),
        }
    }
}

impl fmt::Display for IslSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.set.to_str())
    }
}

impl fmt::Debug for IslSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// An access or dependence relation, e.g. `{ [i, k] -> [t] : t = i }`.
pub struct IslMap {
    // Declared before `ctx` so the map is freed first.
    map: Map,
    ctx: Arc<Context>,
}

impl IslMap {
    /// Parse a map in isl notation.
    pub fn parse(ctx: &Arc<Context>, text: &str) -> Self {
        Self {
            map: Map::read_from_str(ctx, text),
            ctx: Arc::clone(ctx),
        }
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn context(&self) -> &Arc<Context> {
        &self.ctx
    }

    fn with_map(&self, map: Map) -> Self {
        Self {
            map,
            ctx: Arc::clone(&self.ctx),
        }
    }
}

impl Clone for IslMap {
    fn clone(&self) -> Self {
        self.with_map(self.map.copy())
    }
}

/// Equality of the relations as point sets, not of their text.
impl PartialEq for IslMap {
    fn eq(&self, other: &Self) -> bool {
        self.map.is_equal(&other.map)
    }
}

impl fmt::Display for IslMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.map.to_str())
    }
}

impl fmt::Debug for IslMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl AffineRelation for IslMap {
    type Space = IslSet;

    fn identity(space: &IslSet) -> Self {
        Self {
            map: Map::identity(space.set.get_space().map_from_set()),
            ctx: Arc::clone(&space.ctx),
        }
    }

    fn apply_range(&self, next: &Self) -> Self {
        self.with_map(self.map.copy().apply_range(next.map.copy()))
    }

    fn reverse(&self) -> Self {
        self.with_map(self.map.copy().reverse())
    }

    fn dim(&self, ty: DimType) -> usize {
        self.map.dim(isl_dim_type(ty)) as usize
    }

    fn project_out(&self, ty: DimType, first: usize, n: usize) -> Self {
        self.with_map(
            self.map
                .copy()
                .project_out(isl_dim_type(ty), first as u32, n as u32),
        )
    }

    fn is_single_valued(&self) -> bool {
        self.map.is_single_valued()
    }

    fn involves_dims(&self, ty: DimType, first: usize, n: usize) -> bool {
        self.map
            .involves_dims(isl_dim_type(ty), first as u32, n as u32)
    }

    fn n_basic_relations(&self) -> usize {
        self.map.n_basic_map() as usize
    }

    fn to_multi_pw_aff(&self) -> Option<MultiPwAff> {
        if !self.is_single_valued() {
            return None;
        }
        let functions =
            isl_rs::MultiPwAff::from_pw_multi_aff(PwMultiAff::from_map(self.map.copy()));
        let components = (0..functions.size())
            .map(|k| {
                let component = functions.get_at(k);
                match component.n_piece() {
                    1 => {
                        let aff = component.as_aff();
                        // floor(j / 2) and friends are not affine in the inputs.
                        if uses_division(&aff) {
                            PwAff::opaque(1)
                        } else {
                            PwAff::from_aff(to_aff(&aff))
                        }
                    }
                    n => PwAff::opaque(n as usize),
                }
            })
            .collect();
        Some(MultiPwAff::new(components))
    }
}

fn to_aff(aff: &isl_rs::Aff) -> Aff {
    let n_in = aff.dim(isl_rs::DimType::In);
    Aff::from_rationals(
        (0..n_in).map(|i| rational(&aff.get_coefficient_val(isl_rs::DimType::In, i))),
        rational(&aff.get_constant_val()),
    )
}

fn uses_division(aff: &isl_rs::Aff) -> bool {
    (0..aff.dim(isl_rs::DimType::Div))
        .any(|d| !aff.get_coefficient_val(isl_rs::DimType::Div, d).is_zero())
}

fn rational(value: &Val) -> (i64, i64) {
    (value.get_num_si(), value.get_den_si())
}
