//! Error-free transformations of native floating-point operations
//!
//! Each transform returns a pair `(hi, lo)` where `hi` is the rounded result of
//! the native operation and `lo` is its exact rounding error, so that
//! `hi + lo` equals the infinitely precise result. These are the building
//! blocks for [`CompensatedScalar`](super::CompensatedScalar), following
//! Rump, "High precision evaluation of nonlinear functions" (2005).

use crate::constants::VELTKAMP_SPLITTER;

/// Knuth's TwoSum: exact sum of two numbers in any magnitude order.
///
/// Cost: 6 floating-point operations.
#[inline]
pub fn two_sum(a: f64, b: f64) -> (f64, f64) {
    let hi = a + b;
    let z = hi - a;
    let lo = (a - (hi - z)) + (b - z);
    (hi, lo)
}

/// Veltkamp's split of a 53-bit significand into two halves of at most 26 bits
/// with `a == hi + lo` exactly.
///
/// Cost: 4 floating-point operations.
#[inline]
pub fn split(a: f64) -> (f64, f64) {
    let c = VELTKAMP_SPLITTER * a;
    let hi = c - (c - a);
    let lo = a - hi;
    (hi, lo)
}

/// Dekker's TwoProduct: exact product from split partial products.
///
/// Cost: 17 floating-point operations.
#[inline]
pub fn two_product(a: f64, b: f64) -> (f64, f64) {
    let hi = a * b;
    let (a1, a2) = split(a);
    let (b1, b2) = split(b);
    let lo = a2 * b2 - (((hi - a1 * b1) - a2 * b1) - a1 * b2);
    (hi, lo)
}
