//! Utilities for converting between our sparse vectors and external libraries

use ndarray::ArrayView1;
use sprs::{CsVec, CsVecView};

use crate::scalar::Element;
use crate::vector::SparseAccumulator;

/// Converts the live entries to an sprs `CsVec` with sorted indices
pub fn to_sprs_vec<T: Element>(vector: &SparseAccumulator<T>) -> CsVec<T> {
    debug_assert!(
        vector.state().is_tracked(),
        "exporting an invalidated live list"
    );

    let mut entries: Vec<(usize, T)> = vector
        .live_indices()
        .iter()
        .map(|&index| (index, vector.get(index)))
        .collect();
    entries.sort_unstable_by_key(|&(index, _)| index);

    let (indices, values): (Vec<usize>, Vec<T>) = entries.into_iter().unzip();
    CsVec::new(vector.dimension(), indices, values)
}

/// Builds an accumulator from an sprs sparse vector
///
/// Entries are scatter-added in storage order, so magnitudes below
/// [`TINY`](crate::constants::TINY) are flushed like any other tracked update.
pub fn from_sprs_vec<T: Element>(vector: CsVecView<'_, T>) -> SparseAccumulator<T> {
    let mut accumulator = SparseAccumulator::new(vector.dim());
    for (index, &value) in vector.iter() {
        accumulator.scatter_add(index, value);
    }
    accumulator
}

/// Views the dense store as an ndarray
pub fn dense_view<T: Element>(vector: &SparseAccumulator<T>) -> ArrayView1<'_, T> {
    ArrayView1::from(vector.dense_values())
}

/// Builds an accumulator from dense values, listing every non-zero position
pub fn from_dense_array<T: Element>(values: ArrayView1<'_, T>) -> SparseAccumulator<T> {
    let mut accumulator = SparseAccumulator::new(values.len());
    for (target, &value) in accumulator.dense_values_mut().iter_mut().zip(values.iter()) {
        *target = value;
    }
    accumulator.rebuild_indices_from_dense();
    accumulator
}
