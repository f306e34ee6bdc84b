//! Affine functions extracted from single-valued relations.
//!
//! These are plain values, detached from whichever engine produced them, so
//! the analysis can inspect coefficients without touching engine handles.

use smallvec::SmallVec;

type Coeffs = SmallVec<[i64; 8]>;

/// An affine function `(coeffs · x + constant) / denominator`.
///
/// Stored in lowest terms with a positive denominator, so two functions are
/// equal exactly when their `Aff`s compare equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Aff {
    coeffs: Coeffs,
    constant: i64,
    denominator: i64,
}

impl Aff {
    /// Integer affine function over `coeffs.len()` inputs.
    pub fn new(coeffs: impl IntoIterator<Item = i64>, constant: i64) -> Self {
        Self::with_denominator(coeffs, constant, 1)
    }

    /// # Panics
    ///
    /// Panics if `denominator` is zero.
    pub fn with_denominator(
        coeffs: impl IntoIterator<Item = i64>,
        constant: i64,
        denominator: i64,
    ) -> Self {
        assert_ne!(denominator, 0, "affine function with zero denominator");
        let mut aff = Self {
            coeffs: coeffs.into_iter().collect(),
            constant,
            denominator,
        };
        if aff.denominator < 0 {
            aff.coeffs.iter_mut().for_each(|c| *c = -*c);
            aff.constant = -aff.constant;
            aff.denominator = -aff.denominator;
        }
        let g = aff
            .coeffs
            .iter()
            .fold(gcd(aff.constant, aff.denominator), |acc, &c| gcd(acc, c));
        if g > 1 {
            aff.coeffs.iter_mut().for_each(|c| *c /= g);
            aff.constant /= g;
            aff.denominator /= g;
        }
        aff
    }

    /// Build from one `(numerator, denominator)` per coefficient and for the
    /// constant, as engines report them.
    ///
    /// # Panics
    ///
    /// Panics if a denominator is zero or the common denominator overflows.
    pub fn from_rationals(
        coeffs: impl IntoIterator<Item = (i64, i64)>,
        constant: (i64, i64),
    ) -> Self {
        let coeffs: Vec<(i64, i64)> = coeffs.into_iter().collect();
        let common = coeffs
            .iter()
            .chain([&constant])
            .try_fold(1i64, |acc, &(_, den)| {
                assert_ne!(den, 0, "rational with zero denominator");
                (acc / gcd(acc, den)).checked_mul(den.abs())
            })
            .expect("common denominator overflows i64");
        let scale = |(num, den): (i64, i64)| {
            num.checked_mul(common / den)
                .expect("affine coefficient overflows i64")
        };
        Self::with_denominator(coeffs.into_iter().map(scale), scale(constant), common)
    }

    /// The `i`-th input of `n_in`.
    pub fn var(n_in: usize, i: usize) -> Self {
        let mut coeffs: Coeffs = SmallVec::from_elem(0, n_in);
        coeffs[i] = 1;
        Self::new(coeffs, 0)
    }

    /// Constant function over `n_in` inputs.
    pub fn constant(n_in: usize, value: i64) -> Self {
        Self::new(std::iter::repeat_n(0, n_in), value)
    }

    pub fn n_in(&self) -> usize {
        self.coeffs.len()
    }

    /// Coefficient of input `i` as `(numerator, denominator)`.
    pub fn coefficient(&self, i: usize) -> (i64, i64) {
        (self.coeffs[i], self.denominator)
    }

    /// Whether the coefficient of input `i` equals the integer `value`.
    pub fn coefficient_is(&self, i: usize, value: i64) -> bool {
        value
            .checked_mul(self.denominator)
            .is_some_and(|scaled| self.coeffs[i] == scaled)
    }

    /// Constant term as `(numerator, denominator)`.
    pub fn constant_term(&self) -> (i64, i64) {
        (self.constant, self.denominator)
    }

    pub fn constant_is(&self, value: i64) -> bool {
        value
            .checked_mul(self.denominator)
            .is_some_and(|scaled| self.constant == scaled)
    }

    pub fn denominator(&self) -> i64 {
        self.denominator
    }

    pub fn is_constant(&self) -> bool {
        self.coeffs.iter().all(|&c| c == 0)
    }
}

/// A piecewise-affine function of one output.
///
/// Only a single-piece, division-free function keeps its expression;
/// otherwise the analysis needs nothing but the piece count.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PwAff {
    n_piece: usize,
    aff: Option<Aff>,
}

impl PwAff {
    pub fn from_aff(aff: Aff) -> Self {
        Self {
            n_piece: 1,
            aff: Some(aff),
        }
    }

    /// A function whose expression is not exposed: it is split over
    /// `n_piece` guarded pieces (none when its domain is empty), or its one
    /// piece needs integer division.
    pub fn opaque(n_piece: usize) -> Self {
        Self { n_piece, aff: None }
    }

    pub fn n_piece(&self) -> usize {
        self.n_piece
    }

    /// The affine function when there is exactly one piece.
    pub fn as_aff(&self) -> Option<&Aff> {
        self.aff.as_ref()
    }
}

/// One piecewise-affine function per output dimension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultiPwAff {
    components: Vec<PwAff>,
}

impl MultiPwAff {
    pub fn new(components: Vec<PwAff>) -> Self {
        Self { components }
    }

    pub fn size(&self) -> usize {
        self.components.len()
    }

    pub fn get_at(&self, i: usize) -> &PwAff {
        &self.components[i]
    }

    pub fn components(&self) -> &[PwAff] {
        &self.components
    }
}

fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.unsigned_abs(), b.unsigned_abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    // Only `gcd(i64::MIN, 0)` does not fit; treat it as no common factor.
    i64::try_from(a).unwrap_or(1)
}
