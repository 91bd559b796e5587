//! Scalar types and the numeric capability set used by the sparse containers

pub mod compensated;
pub mod eft;

use std::fmt::{Debug, Display};
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use num_traits::{One, Zero};

pub use compensated::CompensatedScalar;
pub use eft::{split, two_product, two_sum};

/// Numeric element stored by a [`SparseAccumulator`](crate::SparseAccumulator)
///
/// This is the minimal capability set the containers rely on: ring arithmetic,
/// comparison against zero, and a conversion to native precision for magnitude
/// tests and diagnostics. Conversions between element types are explicit and
/// go through [`num_traits::AsPrimitive`].
pub trait Element:
    Copy
    + PartialEq
    + Zero
    + One
    + Neg<Output = Self>
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + AddAssign
    + Display
    + Debug
    + 'static
{
    /// Collapses the value to an `f64`
    fn to_native(self) -> f64;

    /// Builds an element from an `f64`
    fn from_native(value: f64) -> Self;

    /// Absolute value in native precision
    #[inline]
    fn magnitude(self) -> f64 {
        self.to_native().abs()
    }
}

impl Element for f64 {
    #[inline]
    fn to_native(self) -> f64 {
        self
    }

    #[inline]
    fn from_native(value: f64) -> Self {
        value
    }
}

impl Element for f32 {
    #[inline]
    fn to_native(self) -> f64 {
        f64::from(self)
    }

    #[inline]
    fn from_native(value: f64) -> Self {
        value as f32
    }
}

impl Element for CompensatedScalar {
    #[inline]
    fn to_native(self) -> f64 {
        self.to_f64()
    }

    #[inline]
    fn from_native(value: f64) -> Self {
        CompensatedScalar::new(value)
    }
}
