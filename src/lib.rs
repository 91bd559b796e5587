//! # hypersparse: compensated scalars and hyper-sparse accumulators
//!
//! Numerical primitives for simplex-style sparse linear algebra.
//!
//! ## Overview
//!
//! This library provides three building blocks:
//!
//! - [`CompensatedScalar`]: a double-double number built from error-free
//!   transformations, with roughly twice the precision of an `f64`
//! - [`SparseAccumulator`]: a hyper-sparse vector over any [`Element`] type,
//!   keeping a dense array and an explicit list of live positions so that
//!   scatter-adds, AXPY, clearing and pruning cost `O(live)` instead of `O(n)`
//! - [`PrecisionSparseSum`]: a scatter-add accumulator over compensated values
//!   whose live list survives exact cancellation
//!
//! ## Usage
//!
//! Accumulating contributions of very different magnitudes:
//!
//! ```
//! use hypersparse::PrecisionSparseSum;
//!
//! let mut sum = PrecisionSparseSum::new(100);
//! sum.add(5, 1.0);
//! sum.add(5, 1e-18);
//! sum.add(5, -1.0);
//!
//! assert!((sum.get_value(5) - 1e-18).abs() < 1e-25);
//! assert_eq!(sum.non_zeros(), &[5]);
//! ```
//!
//! Sparse AXPY over native values:
//!
//! ```
//! use hypersparse::SparseAccumulator;
//!
//! let mut y = SparseAccumulator::<f64>::new(10);
//! y.scatter_add(1, 10.0);
//!
//! let mut x = SparseAccumulator::<f64>::new(10);
//! x.scatter_add(1, 2.0);
//! x.scatter_add(3, 4.0);
//!
//! y.saxpy(0.5, &x);
//! assert_eq!(y.get(1), 11.0);
//! assert_eq!(y.live_indices(), &[1, 3]);
//! ```

pub mod constants;
pub mod scalar;
pub mod utils;
pub mod vector;

// Re-export primary components
pub use scalar::{CompensatedScalar, Element};
pub use utils::{dense_view, from_dense_array, from_sprs_vec, to_sprs_vec};
pub use vector::{PrecisionSparseSum, SparseAccumulator, StorageState, PRESENCE_SENTINEL};

/// Version information for the hypersparse library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
