//! Double-double scalar built from error-free transformations
//!
//! A [`CompensatedScalar`] represents a real number as the unevaluated sum
//! `hi + lo` of two `f64` words. `hi` is the rounded approximation and `lo`
//! carries the rounding error accumulated so far, giving roughly 106 bits of
//! significand using only ordinary floating-point instructions.
//!
//! Arithmetic keeps the pair valid to first order; [`CompensatedScalar::renormalize`]
//! restores the canonical form where `|lo|` is minimal relative to `|hi|`.
//! Comparisons collapse both sides to `f64` first, so two values differing
//! only in `lo` below the last native bit compare equal.

use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use num_traits::{AsPrimitive, One, ToPrimitive, Zero};

use super::eft::{two_product, two_sum};

/// A compensated (double-double) floating-point number.
///
/// The type never signals failure: division by zero, square roots of negative
/// numbers and overflow follow native IEEE semantics and propagate infinities
/// or NaNs through both components.
#[derive(Clone, Copy, Debug, Default)]
pub struct CompensatedScalar {
    hi: f64,
    lo: f64,
}

impl CompensatedScalar {
    /// Exact zero.
    pub const ZERO: Self = Self { hi: 0.0, lo: 0.0 };

    /// Exact one.
    pub const ONE: Self = Self { hi: 1.0, lo: 0.0 };

    /// Creates a value with no accumulated error.
    #[inline]
    pub const fn new(value: f64) -> Self {
        Self { hi: value, lo: 0.0 }
    }

    /// Creates a value from an explicit `(hi, lo)` pair, taken as-is.
    #[inline]
    pub const fn from_parts(hi: f64, lo: f64) -> Self {
        Self { hi, lo }
    }

    /// The high-order component.
    #[inline]
    pub const fn hi(self) -> f64 {
        self.hi
    }

    /// The low-order component (captured rounding error).
    #[inline]
    pub const fn lo(self) -> f64 {
        self.lo
    }

    /// Collapses to native precision as `hi + lo`.
    #[inline]
    pub fn to_f64(self) -> f64 {
        self.hi + self.lo
    }

    /// Recomputes `(hi, lo)` through an exact sum so that `|lo|` is minimal.
    #[inline]
    pub fn renormalize(&mut self) {
        let (hi, lo) = two_sum(self.hi, self.lo);
        self.hi = hi;
        self.lo = lo;
    }

    /// Returns a renormalized copy.
    #[inline]
    pub fn renormalized(mut self) -> Self {
        self.renormalize();
        self
    }

    #[inline]
    pub fn abs(self) -> Self {
        if self < 0.0 {
            -self
        } else {
            self
        }
    }

    /// Square root refined by one Newton step evaluated in compensated arithmetic.
    ///
    /// The native `sqrt` of the collapsed value seeds the iteration
    /// `0.5 * (seed + x / seed)`. A zero seed returns exact zero.
    pub fn sqrt(self) -> Self {
        let seed = self.to_f64().sqrt();
        if seed == 0.0 {
            return Self::ZERO;
        }

        let mut refined = self / seed;
        refined += seed;
        // Halving is exact
        refined.hi *= 0.5;
        refined.lo *= 0.5;
        refined
    }

    /// Largest integer not greater than `self`.
    ///
    /// Values strictly inside (-1, 1) are answered directly, since flooring the
    /// residual of a value near the unit interval loses the sign of tiny parts.
    pub fn floor(self) -> Self {
        if self.abs() < 1.0 {
            return if self == 0.0 || self > 0.0 {
                Self::ZERO
            } else {
                Self::new(-1.0)
            };
        }

        let floor_hi = self.to_f64().floor();
        let floor_lo = (self - floor_hi).to_f64().floor();
        let (hi, lo) = two_sum(floor_hi, floor_lo);
        Self { hi, lo }
    }

    /// Smallest integer not less than `self`.
    ///
    /// Values strictly inside (-1, 1) are answered directly, see [`Self::floor`].
    pub fn ceil(self) -> Self {
        if self.abs() < 1.0 {
            return if self == 0.0 || self < 0.0 {
                Self::ZERO
            } else {
                Self::ONE
            };
        }

        let ceil_hi = self.to_f64().ceil();
        let ceil_lo = (self - ceil_hi).to_f64().ceil();
        let (hi, lo) = two_sum(ceil_hi, ceil_lo);
        Self { hi, lo }
    }

    /// Rounds as `floor(self + 0.5)`.
    ///
    /// Ties therefore always move towards positive infinity: `-2.5` rounds to `-2`.
    #[inline]
    pub fn round(self) -> Self {
        (self + 0.5).floor()
    }

    /// Multiplies both components by `2^exp`; exact while the result stays
    /// inside the native exponent range.
    #[inline]
    pub fn ldexp(self, exp: i32) -> Self {
        Self {
            hi: ldexp_f64(self.hi, exp),
            lo: ldexp_f64(self.lo, exp),
        }
    }
}

/// Scales `x` by `2^exp` using exactly representable powers of two.
fn ldexp_f64(mut x: f64, mut exp: i32) -> f64 {
    const MAX_EXP: i32 = 1023;
    const MIN_EXP: i32 = -1022;

    while exp > MAX_EXP {
        x *= pow2(MAX_EXP);
        exp -= MAX_EXP;
        if x.is_infinite() || x == 0.0 {
            return x;
        }
    }
    while exp < MIN_EXP {
        x *= pow2(MIN_EXP);
        exp -= MIN_EXP;
        if x == 0.0 {
            return x;
        }
    }
    x * pow2(exp)
}

/// `2^exp` for a normal exponent, built from its bit pattern.
#[inline]
fn pow2(exp: i32) -> f64 {
    debug_assert!((-1022..=1023).contains(&exp));
    f64::from_bits(((exp + 1023) as u64) << 52)
}

impl From<f64> for CompensatedScalar {
    #[inline]
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<f32> for CompensatedScalar {
    #[inline]
    fn from(value: f32) -> Self {
        Self::new(f64::from(value))
    }
}

impl From<CompensatedScalar> for f64 {
    #[inline]
    fn from(value: CompensatedScalar) -> Self {
        value.to_f64()
    }
}

// ---------------------------------------------------------------------------
// In-place arithmetic
// ---------------------------------------------------------------------------

impl AddAssign<f64> for CompensatedScalar {
    #[inline]
    fn add_assign(&mut self, rhs: f64) {
        let (hi, err) = two_sum(rhs, self.hi);
        self.hi = hi;
        self.lo += err;
    }
}

impl AddAssign for CompensatedScalar {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self += rhs.hi;
        self.lo += rhs.lo;
    }
}

impl SubAssign<f64> for CompensatedScalar {
    #[inline]
    fn sub_assign(&mut self, rhs: f64) {
        *self += -rhs;
    }
}

impl SubAssign for CompensatedScalar {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self -= rhs.hi;
        self.lo -= rhs.lo;
    }
}

impl MulAssign<f64> for CompensatedScalar {
    #[inline]
    fn mul_assign(&mut self, rhs: f64) {
        let carry = self.lo * rhs;
        let (hi, lo) = two_product(self.hi, rhs);
        self.hi = hi;
        self.lo = lo;
        *self += carry;
    }
}

impl MulAssign for CompensatedScalar {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        let cross_hi = self.hi * rhs.lo;
        let cross_lo = self.lo * rhs.hi;
        let (hi, lo) = two_product(self.hi, rhs.hi);
        self.hi = hi;
        self.lo = lo;
        *self += cross_hi;
        *self += cross_lo;
    }
}

impl DivAssign<f64> for CompensatedScalar {
    /// Componentwise quotient followed by one residual correction.
    #[inline]
    fn div_assign(&mut self, rhs: f64) {
        let quotient = Self::from_parts(self.hi / rhs, self.lo / rhs);
        let mut residual = quotient * rhs - *self;
        residual.hi /= rhs;
        residual.lo /= rhs;
        *self = quotient - residual;
    }
}

impl DivAssign for CompensatedScalar {
    #[inline]
    fn div_assign(&mut self, rhs: Self) {
        let divisor = rhs.to_f64();
        let quotient = Self::from_parts(self.hi / divisor, self.lo / divisor);
        let mut residual = quotient * rhs - *self;
        residual.hi /= divisor;
        residual.lo /= divisor;
        *self = quotient - residual;
    }
}

// ---------------------------------------------------------------------------
// Binary arithmetic
// ---------------------------------------------------------------------------

impl Neg for CompensatedScalar {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self {
            hi: -self.hi,
            lo: -self.lo,
        }
    }
}

impl Add<f64> for CompensatedScalar {
    type Output = Self;

    #[inline]
    fn add(self, rhs: f64) -> Self {
        let (hi, lo) = two_sum(self.hi, rhs);
        Self {
            hi,
            lo: lo + self.lo,
        }
    }
}

impl Add for CompensatedScalar {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        let mut sum = self + rhs.hi;
        sum.lo += rhs.lo;
        sum
    }
}

impl Add<CompensatedScalar> for f64 {
    type Output = CompensatedScalar;

    #[inline]
    fn add(self, rhs: CompensatedScalar) -> CompensatedScalar {
        rhs + self
    }
}

impl Sub<f64> for CompensatedScalar {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: f64) -> Self {
        let (hi, lo) = two_sum(self.hi, -rhs);
        Self {
            hi,
            lo: lo + self.lo,
        }
    }
}

impl Sub for CompensatedScalar {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        let mut difference = self - rhs.hi;
        difference.lo -= rhs.lo;
        difference
    }
}

impl Sub<CompensatedScalar> for f64 {
    type Output = CompensatedScalar;

    #[inline]
    fn sub(self, rhs: CompensatedScalar) -> CompensatedScalar {
        -rhs + self
    }
}

impl Mul<f64> for CompensatedScalar {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f64) -> Self {
        let (hi, lo) = two_product(self.hi, rhs);
        let mut product = Self { hi, lo };
        product += self.lo * rhs;
        product
    }
}

impl Mul for CompensatedScalar {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let mut product = self * rhs.hi;
        product += self.hi * rhs.lo;
        product
    }
}

impl Mul<CompensatedScalar> for f64 {
    type Output = CompensatedScalar;

    #[inline]
    fn mul(self, rhs: CompensatedScalar) -> CompensatedScalar {
        rhs * self
    }
}

impl Div<f64> for CompensatedScalar {
    type Output = Self;

    #[inline]
    fn div(mut self, rhs: f64) -> Self {
        self /= rhs;
        self
    }
}

impl Div for CompensatedScalar {
    type Output = Self;

    #[inline]
    fn div(mut self, rhs: Self) -> Self {
        self /= rhs;
        self
    }
}

impl Div<CompensatedScalar> for f64 {
    type Output = CompensatedScalar;

    #[inline]
    fn div(self, rhs: CompensatedScalar) -> CompensatedScalar {
        CompensatedScalar::new(self) / rhs
    }
}

// ---------------------------------------------------------------------------
// Comparisons (collapsed to native precision)
// ---------------------------------------------------------------------------

impl PartialEq for CompensatedScalar {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        CompensatedScalar::to_f64(*self) == CompensatedScalar::to_f64(*other)
    }
}

impl PartialEq<f64> for CompensatedScalar {
    #[inline]
    fn eq(&self, other: &f64) -> bool {
        CompensatedScalar::to_f64(*self) == *other
    }
}

impl PartialEq<CompensatedScalar> for f64 {
    #[inline]
    fn eq(&self, other: &CompensatedScalar) -> bool {
        *self == CompensatedScalar::to_f64(*other)
    }
}

impl PartialOrd for CompensatedScalar {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        CompensatedScalar::to_f64(*self).partial_cmp(&CompensatedScalar::to_f64(*other))
    }
}

impl PartialOrd<f64> for CompensatedScalar {
    #[inline]
    fn partial_cmp(&self, other: &f64) -> Option<Ordering> {
        CompensatedScalar::to_f64(*self).partial_cmp(other)
    }
}

impl PartialOrd<CompensatedScalar> for f64 {
    #[inline]
    fn partial_cmp(&self, other: &CompensatedScalar) -> Option<Ordering> {
        self.partial_cmp(&CompensatedScalar::to_f64(*other))
    }
}

// ---------------------------------------------------------------------------
// Ecosystem traits
// ---------------------------------------------------------------------------

impl Zero for CompensatedScalar {
    #[inline]
    fn zero() -> Self {
        Self::ZERO
    }

    #[inline]
    fn is_zero(&self) -> bool {
        *self == 0.0
    }
}

impl One for CompensatedScalar {
    #[inline]
    fn one() -> Self {
        Self::ONE
    }
}

impl ToPrimitive for CompensatedScalar {
    #[inline]
    fn to_i64(&self) -> Option<i64> {
        CompensatedScalar::to_f64(*self).to_i64()
    }

    #[inline]
    fn to_u64(&self) -> Option<u64> {
        CompensatedScalar::to_f64(*self).to_u64()
    }

    #[inline]
    fn to_f64(&self) -> Option<f64> {
        Some(CompensatedScalar::to_f64(*self))
    }
}

impl AsPrimitive<CompensatedScalar> for CompensatedScalar {
    #[inline]
    fn as_(self) -> CompensatedScalar {
        self
    }
}

impl AsPrimitive<CompensatedScalar> for f64 {
    #[inline]
    fn as_(self) -> CompensatedScalar {
        CompensatedScalar::new(self)
    }
}

impl AsPrimitive<CompensatedScalar> for f32 {
    #[inline]
    fn as_(self) -> CompensatedScalar {
        CompensatedScalar::from(self)
    }
}

impl AsPrimitive<f64> for CompensatedScalar {
    #[inline]
    fn as_(self) -> f64 {
        self.to_f64()
    }
}

impl AsPrimitive<f32> for CompensatedScalar {
    #[inline]
    fn as_(self) -> f32 {
        self.to_f64() as f32
    }
}

impl Sum for CompensatedScalar {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |mut acc, value| {
            acc += value;
            acc
        })
    }
}

impl Sum<f64> for CompensatedScalar {
    fn sum<I: Iterator<Item = f64>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |mut acc, value| {
            acc += value;
            acc
        })
    }
}

impl<'a> Sum<&'a f64> for CompensatedScalar {
    fn sum<I: Iterator<Item = &'a f64>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl fmt::Display for CompensatedScalar {
    /// Prints the collapsed native value.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&CompensatedScalar::to_f64(*self), f)
    }
}
