//! Scatter-add accumulator over compensated values with presence sentinels
//!
//! [`PrecisionSparseSum`] is a [`SparseAccumulator`] fixed to
//! [`CompensatedScalar`] entries. Its tracked add never lets a touched entry
//! read back as zero: an exact cancellation stores `f64::MIN_POSITIVE`
//! instead, so the live list keeps answering "has this index received a
//! contribution" independently of the arithmetic.

use std::fmt;
use std::ops::{AddAssign, Index, IndexMut, SubAssign};

use num_traits::AsPrimitive;

use crate::scalar::{CompensatedScalar, Element};
use crate::vector::accumulator::SparseAccumulator;
use crate::vector::state::StorageState;
use crate::vector::write_live_entries;

/// Value stored in place of an exactly cancelled entry
pub const PRESENCE_SENTINEL: f64 = f64::MIN_POSITIVE;

/// High-precision sparse scatter-add accumulator
#[derive(Clone, Default, PartialEq)]
pub struct PrecisionSparseSum {
    inner: SparseAccumulator<CompensatedScalar>,
}

impl PrecisionSparseSum {
    /// Creates a zero sum of the given dimension
    pub fn new(dimension: usize) -> Self {
        Self {
            inner: SparseAccumulator::new(dimension),
        }
    }

    /// Resizes the dense storage, discarding previous contents
    pub fn set_dimension(&mut self, dimension: usize) {
        self.inner.setup(dimension);
    }

    /// Adds `value` at `index`, tracking the index on first contribution
    ///
    /// If the accumulated value collapses to exactly zero it is replaced by
    /// [`PRESENCE_SENTINEL`], keeping the index live.
    pub fn add<V: Into<CompensatedScalar>>(&mut self, index: usize, value: V) {
        debug_assert!(
            index < self.inner.dimension(),
            "index {} out of bounds",
            index
        );

        let value = value.into();
        self.inner.track(index);

        let slot = &mut self.inner.dense_values[index];
        if *slot != 0.0 {
            *slot += value;
        } else {
            *slot = value;
        }

        if *slot == 0.0 {
            *slot = CompensatedScalar::new(PRESENCE_SENTINEL);
        }
        self.inner.packed_dirty = true;
    }

    /// Indices that have received at least one contribution, in list order
    #[inline]
    pub fn non_zeros(&self) -> &[usize] {
        self.inner.live_indices()
    }

    /// Native approximation of the value at `index`
    #[inline]
    pub fn get_value(&self, index: usize) -> f64 {
        self.inner.get(index).to_f64()
    }

    /// Full compensated value at `index`
    #[inline]
    pub fn get(&self, index: usize) -> CompensatedScalar {
        self.inner.get(index)
    }

    /// Zeroes the sum and empties the live list, see [`SparseAccumulator::clear`]
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Reorders the live list so indices satisfying `pred` come first
    ///
    /// Returns how many indices satisfied it. Relative order on either side
    /// of the split is not preserved.
    pub fn partition<P>(&mut self, mut pred: P) -> usize
    where
        P: FnMut(usize) -> bool,
    {
        let indices = &mut self.inner.non_zero_indices;
        let mut split = 0;
        for position in 0..indices.len() {
            if pred(indices[position]) {
                indices.swap(split, position);
                split += 1;
            }
        }
        self.inner.packed_dirty = true;
        split
    }

    /// Resets and untracks every live entry for which `is_zero(index, value)` holds
    ///
    /// Removed entries are swapped with the tail of the live list, so the
    /// remaining order is not otherwise preserved.
    pub fn cleanup<Z>(&mut self, mut is_zero: Z)
    where
        Z: FnMut(usize, f64) -> bool,
    {
        let indices = &mut self.inner.non_zero_indices;
        let values = &mut self.inner.dense_values;
        let listed = &mut self.inner.listed;

        let mut live = indices.len();
        for position in (0..indices.len()).rev() {
            let index = indices[position];
            if is_zero(index, values[index].to_f64()) {
                values[index] = CompensatedScalar::ZERO;
                listed[index] = false;
                live -= 1;
                indices.swap(live, position);
            }
        }

        if live != indices.len() {
            indices.truncate(live);
            self.inner.packed_dirty = true;
        }
    }

    /// Sentinel-preserving AXPY: [`Self::add`] of `multiplier * x[i]` for every live `i` of `x`
    pub fn saxpy<U>(&mut self, multiplier: CompensatedScalar, x: &SparseAccumulator<U>)
    where
        U: Element + AsPrimitive<CompensatedScalar>,
    {
        debug_assert!(x.live_valid, "saxpy from an invalidated live list");
        for &index in x.live_indices() {
            let value: CompensatedScalar = x.dense_values[index].as_();
            self.add(index, multiplier * value);
        }
    }

    /// Replaces the contents with a widened copy of `source`
    pub fn copy_from<U>(&mut self, source: &SparseAccumulator<U>)
    where
        U: Element + AsPrimitive<CompensatedScalar>,
    {
        self.inner.copy_from(source);
    }

    /// Drops live entries below [`TINY`](crate::constants::TINY), see [`SparseAccumulator::prune_small_values`]
    pub fn prune_small_values(&mut self) {
        self.inner.prune_small_values();
    }

    /// Drops live entries whose magnitude is below `threshold`
    pub fn prune_below(&mut self, threshold: f64) {
        self.inner.prune_below(threshold);
    }

    /// Refreshes the packed `(index, value)` cache if it is stale
    pub fn create_packed_storage(&mut self) {
        self.inner.create_packed_storage();
    }

    /// Packed view as of the last [`Self::create_packed_storage`]
    #[inline]
    pub fn packed(&self) -> (&[usize], &[CompensatedScalar]) {
        self.inner.packed()
    }

    /// Rescans the dense array for live entries, see [`SparseAccumulator::rebuild_indices_from_dense`]
    pub fn rebuild_indices_from_dense(&mut self) {
        self.inner.rebuild_indices_from_dense();
    }

    /// Compensated sum of squares over the live entries
    pub fn squared_euclidean_norm(&self) -> CompensatedScalar {
        self.inner.squared_euclidean_norm()
    }

    /// Consistency of the live list and packed cache with the dense array
    #[inline]
    pub fn state(&self) -> StorageState {
        self.inner.state()
    }

    /// Logical length of the sum
    #[inline]
    pub fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    /// True for a zero-dimension sum
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Capacity of the dense backing store
    #[inline]
    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    /// Synthetic tick compared by structural equality
    #[inline]
    pub fn tag(&self) -> f64 {
        self.inner.tag()
    }

    /// Sets the synthetic tick
    #[inline]
    pub fn set_tag(&mut self, tick: f64) {
        self.inner.set_tag(tick);
    }

    /// Slot of the next sum in the caller's pool, if any
    #[inline]
    pub fn next_link(&self) -> Option<usize> {
        self.inner.next_link()
    }

    /// Threads this sum into a caller-owned pool
    #[inline]
    pub fn set_next_link(&mut self, link: Option<usize>) {
        self.inner.set_next_link(link);
    }

    /// Iterates over every dense entry
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, CompensatedScalar> {
        self.inner.iter()
    }

    /// Mutable dense iteration; invalidates the live list
    #[inline]
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, CompensatedScalar> {
        self.inner.iter_mut()
    }

    /// The underlying accumulator, e.g. as a `saxpy` or `copy_from` source
    #[inline]
    pub fn as_accumulator(&self) -> &SparseAccumulator<CompensatedScalar> {
        &self.inner
    }

    /// Unwraps into the underlying accumulator
    #[inline]
    pub fn into_accumulator(self) -> SparseAccumulator<CompensatedScalar> {
        self.inner
    }
}

impl From<SparseAccumulator<CompensatedScalar>> for PrecisionSparseSum {
    fn from(inner: SparseAccumulator<CompensatedScalar>) -> Self {
        Self { inner }
    }
}

impl Index<usize> for PrecisionSparseSum {
    type Output = CompensatedScalar;

    #[inline]
    fn index(&self, index: usize) -> &CompensatedScalar {
        &self.inner[index]
    }
}

impl IndexMut<usize> for PrecisionSparseSum {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut CompensatedScalar {
        &mut self.inner[index]
    }
}

impl<'a> IntoIterator for &'a PrecisionSparseSum {
    type Item = &'a CompensatedScalar;
    type IntoIter = std::slice::Iter<'a, CompensatedScalar>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl AddAssign<&PrecisionSparseSum> for PrecisionSparseSum {
    fn add_assign(&mut self, rhs: &PrecisionSparseSum) {
        self.saxpy(CompensatedScalar::ONE, &rhs.inner);
    }
}

impl SubAssign<&PrecisionSparseSum> for PrecisionSparseSum {
    fn sub_assign(&mut self, rhs: &PrecisionSparseSum) {
        self.saxpy(-CompensatedScalar::ONE, &rhs.inner);
    }
}

impl fmt::Display for PrecisionSparseSum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_live_entries(
            f,
            "PrecisionSparseSum",
            self.inner.dimension(),
            self.inner.live_indices(),
            |index| self.inner.get(index),
        )
    }
}

impl fmt::Debug for PrecisionSparseSum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PrecisionSparseSum").field(&self.inner).finish()
    }
}
