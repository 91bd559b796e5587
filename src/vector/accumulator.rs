//! Hyper-sparse vector with a dense backing store and an explicit live list
//!
//! This is the scatter/gather workhorse of a simplex-style solver: constant-time
//! random access through the dense array, and `O(live)` iteration, clearing and
//! AXPY through the list of live positions. See [`super::state`] for how the
//! dense array, live list and packed cache are kept eventually consistent.

use std::fmt;
use std::ops::{AddAssign, Index, IndexMut, SubAssign};

use num_traits::AsPrimitive;
use tracing::{debug, trace};

use crate::constants::{
    prefers_sparse_clear, skips_rebuild, CHAR_WORKSPACE_PADDING, INTEGER_WORKSPACE_FACTOR, TINY,
    ZERO,
};
use crate::scalar::Element;
use crate::vector::state::StorageState;
use crate::vector::write_live_entries;

/// A hyper-sparse vector over a generic numeric [`Element`]
///
/// Positions listed in the live index list hold the maintained values; every
/// other position is assumed to be zero. Writes through [`IndexMut`] or
/// [`SparseAccumulator::dense_values_mut`] bypass the list and move the vector
/// into [`StorageState::Invalidated`] until
/// [`SparseAccumulator::rebuild_indices_from_dense`] runs.
///
/// Cloning is deep. Moving out with [`std::mem::take`] leaves an empty,
/// zero-dimension vector behind.
#[derive(Clone)]
pub struct SparseAccumulator<T> {
    /// Positions considered non-zero, in insertion order
    pub(crate) non_zero_indices: Vec<usize>,

    /// The vector's entries
    pub(crate) dense_values: Vec<T>,

    /// Membership marker for `non_zero_indices`, one per position
    pub(crate) listed: Vec<bool>,

    /// Packed copy of the live indices for downstream consumers
    packed_indices: Vec<usize>,

    /// Packed copy of the live values, parallel to `packed_indices`
    packed_values: Vec<T>,

    /// Flag workspace for algorithms built on top of the container
    char_workspace: Vec<u8>,

    /// Index workspace for algorithms built on top of the container
    integer_workspace: Vec<usize>,

    /// Logical length of the vector
    dimension: usize,

    /// Synthetic tick compared by structural equality
    synthetic_tick: f64,

    /// False once the dense array has been written directly
    pub(crate) live_valid: bool,

    /// True when the packed cache predates the last tracked update
    pub(crate) packed_dirty: bool,

    /// Slot of the next vector in an externally owned pool
    next_link: Option<usize>,
}

impl<T> Default for SparseAccumulator<T> {
    fn default() -> Self {
        Self {
            non_zero_indices: Vec::new(),
            dense_values: Vec::new(),
            listed: Vec::new(),
            packed_indices: Vec::new(),
            packed_values: Vec::new(),
            char_workspace: Vec::new(),
            integer_workspace: Vec::new(),
            dimension: 0,
            synthetic_tick: 0.0,
            live_valid: true,
            packed_dirty: false,
            next_link: None,
        }
    }
}

impl<T: Element> SparseAccumulator<T> {
    /// Creates a zero vector of the given dimension
    pub fn new(dimension: usize) -> Self {
        let mut vector = Self::default();
        vector.setup(dimension);
        vector
    }

    /// Allocates all backing storage for `dimension` entries
    ///
    /// Calling this again resizes the vector and discards its contents.
    pub fn setup(&mut self, dimension: usize) {
        debug!(dimension, "sparse accumulator setup");

        self.dimension = dimension;
        self.non_zero_indices.clear();
        self.non_zero_indices.reserve(dimension);
        self.dense_values.clear();
        self.dense_values.resize(dimension, T::zero());
        self.listed.clear();
        self.listed.resize(dimension, false);

        self.char_workspace.clear();
        self.char_workspace.resize(dimension + CHAR_WORKSPACE_PADDING, 0);
        self.integer_workspace.clear();
        self.integer_workspace
            .resize(dimension * INTEGER_WORKSPACE_FACTOR, 0);

        self.packed_indices.clear();
        self.packed_indices.reserve(dimension);
        self.packed_values.clear();
        self.packed_values.reserve(dimension);

        self.live_valid = true;
        self.packed_dirty = false;
        self.synthetic_tick = 0.0;
        self.next_link = None;
    }

    /// Logical length of the vector
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// True for a zero-dimension vector
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dimension == 0
    }

    /// Capacity of the dense backing store
    #[inline]
    pub fn capacity(&self) -> usize {
        self.dense_values.capacity()
    }

    /// Number of positions in the live list
    #[inline]
    pub fn live_count(&self) -> usize {
        self.non_zero_indices.len()
    }

    /// Live positions in list order
    #[inline]
    pub fn live_indices(&self) -> &[usize] {
        &self.non_zero_indices
    }

    /// Consistency of the live list and packed cache with the dense array
    #[inline]
    pub fn state(&self) -> StorageState {
        StorageState::from_flags(self.live_valid, self.packed_dirty)
    }

    /// Value at `index`, whether or not it is live
    #[inline]
    pub fn get(&self, index: usize) -> T {
        debug_assert!(index < self.dimension, "index {} out of bounds", index);
        self.dense_values[index]
    }

    /// Read access to the whole dense array
    #[inline]
    pub fn dense_values(&self) -> &[T] {
        &self.dense_values
    }

    /// Write access to the whole dense array; invalidates the live list
    #[inline]
    pub fn dense_values_mut(&mut self) -> &mut [T] {
        self.live_valid = false;
        &mut self.dense_values
    }

    /// Iterates over every dense entry
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.dense_values.iter()
    }

    /// Iterates mutably over every dense entry; invalidates the live list
    #[inline]
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.dense_values_mut().iter_mut()
    }

    /// Synthetic tick carried along by `copy_from` and compared by equality
    #[inline]
    pub fn tag(&self) -> f64 {
        self.synthetic_tick
    }

    /// Sets the synthetic tick; reset to zero by `clear` and `setup`
    #[inline]
    pub fn set_tag(&mut self, tick: f64) {
        self.synthetic_tick = tick;
    }

    /// Slot of the next vector in the caller's pool, if any
    #[inline]
    pub fn next_link(&self) -> Option<usize> {
        self.next_link
    }

    /// Threads this vector into a caller-owned pool; the container never follows the link
    #[inline]
    pub fn set_next_link(&mut self, link: Option<usize>) {
        self.next_link = link;
    }

    /// Byte scratch space of `dimension + 6400` entries, never read by the container
    #[inline]
    pub fn char_workspace_mut(&mut self) -> &mut [u8] {
        &mut self.char_workspace
    }

    /// Index scratch space of `4 * dimension` entries, never read by the container
    #[inline]
    pub fn integer_workspace_mut(&mut self) -> &mut [usize] {
        &mut self.integer_workspace
    }

    /// Zeroes the vector and empties the live list
    ///
    /// When fewer than 30% of positions are live only those are reset,
    /// otherwise the whole dense array is. An invalidated vector always takes
    /// the full reset.
    pub fn clear(&mut self) {
        let live = self.non_zero_indices.len();
        if self.live_valid && prefers_sparse_clear(live, self.dimension) {
            trace!(live, dimension = self.dimension, "sparse clear");
            for &index in &self.non_zero_indices {
                self.dense_values[index] = T::zero();
            }
        } else {
            trace!(live, dimension = self.dimension, "dense clear");
            self.dense_values.fill(T::zero());
        }

        self.clear_scalars();
    }

    /// Resets the bookkeeping without touching the dense array
    pub fn clear_scalars(&mut self) {
        for &index in &self.non_zero_indices {
            self.listed[index] = false;
        }
        self.non_zero_indices.clear();
        self.packed_indices.clear();
        self.packed_values.clear();
        self.live_valid = true;
        self.packed_dirty = false;
        self.synthetic_tick = 0.0;
        self.next_link = None;
    }

    /// Drops live entries whose magnitude is below [`TINY`]
    pub fn prune_small_values(&mut self) {
        self.prune_below(TINY);
    }

    /// Drops live entries whose magnitude is below `threshold`, zeroing them
    ///
    /// The surviving indices keep their relative order. On an invalidated
    /// vector the whole dense array is scanned instead and the list is left as is.
    pub fn prune_below(&mut self, threshold: f64) {
        let dense = &mut self.dense_values;

        if !self.live_valid {
            for value in dense.iter_mut() {
                if value.magnitude() < threshold {
                    *value = T::zero();
                }
            }
            return;
        }

        let listed = &mut self.listed;
        let before = self.non_zero_indices.len();
        self.non_zero_indices.retain(|&index| {
            let keep = dense[index].magnitude() >= threshold;
            if !keep {
                dense[index] = T::zero();
                listed[index] = false;
            }
            keep
        });

        if self.non_zero_indices.len() != before {
            self.packed_dirty = true;
        }
    }

    /// Copies the live entries into the packed arrays if they are stale
    pub fn create_packed_storage(&mut self) {
        if !self.packed_dirty {
            return;
        }
        debug_assert!(self.live_valid, "packing an invalidated live list");

        self.packed_dirty = false;
        self.packed_indices.clear();
        self.packed_values.clear();
        for &index in &self.non_zero_indices {
            self.packed_indices.push(index);
            self.packed_values.push(self.dense_values[index]);
        }
        trace!(packed = self.packed_indices.len(), "packed storage rebuilt");
    }

    /// Packed `(indices, values)` as of the last [`Self::create_packed_storage`]
    #[inline]
    pub fn packed(&self) -> (&[usize], &[T]) {
        (&self.packed_indices, &self.packed_values)
    }

    /// Rebuilds the live list by scanning the dense array
    ///
    /// Skipped when the list is tracked and holds at most a tenth of the
    /// dimension; that guard is a heuristic, so after a direct dense write
    /// rely on the vector being [`StorageState::Invalidated`].
    pub fn rebuild_indices_from_dense(&mut self) {
        if self.live_valid && skips_rebuild(self.non_zero_indices.len(), self.dimension) {
            return;
        }

        for &index in &self.non_zero_indices {
            self.listed[index] = false;
        }
        self.non_zero_indices.clear();
        for (index, value) in self.dense_values.iter().enumerate() {
            if value.to_native() != 0.0 {
                self.non_zero_indices.push(index);
                self.listed[index] = true;
            }
        }
        self.live_valid = true;
        self.packed_dirty = true;

        debug!(
            live = self.non_zero_indices.len(),
            dimension = self.dimension,
            "live indices rebuilt from dense array"
        );
    }

    /// Replaces the contents with a converted copy of `source`
    ///
    /// The tag is copied along with the live entries; the pool link is not.
    pub fn copy_from<U>(&mut self, source: &SparseAccumulator<U>)
    where
        U: Element + AsPrimitive<T>,
    {
        if self.dimension == source.dimension {
            self.clear();
        } else {
            self.setup(source.dimension);
        }
        self.synthetic_tick = source.synthetic_tick;

        if source.live_valid {
            for &index in &source.non_zero_indices {
                self.track(index);
                self.dense_values[index] = source.dense_values[index].as_();
            }
        } else {
            for (target, value) in self.dense_values.iter_mut().zip(&source.dense_values) {
                *target = value.as_();
            }
            for &index in &source.non_zero_indices {
                self.track(index);
            }
            self.live_valid = false;
        }
        self.packed_dirty = true;
    }

    /// Sum of squares over the live entries
    pub fn squared_euclidean_norm(&self) -> T {
        debug_assert!(self.live_valid, "norm of an invalidated live list");

        let mut result = T::zero();
        for &index in &self.non_zero_indices {
            let value = self.dense_values[index];
            result += value * value;
        }
        result
    }

    /// Sparse AXPY: `self[i] += multiplier * x[i]` for every live `i` of `x`
    ///
    /// A position not yet in the live list is appended to it, once. Results
    /// with magnitude below [`TINY`] are stored as exact zero but stay listed
    /// until the next prune, so a later fill-in does not list them again.
    /// Cost is `O(live(x))`.
    pub fn saxpy<U>(&mut self, multiplier: T, x: &SparseAccumulator<U>)
    where
        U: Element + AsPrimitive<T>,
    {
        debug_assert!(self.live_valid && x.live_valid, "saxpy on an invalidated live list");
        debug_assert!(x.dimension <= self.dimension);

        for &index in &x.non_zero_indices {
            let value: T = x.dense_values[index].as_();
            self.accumulate(index, multiplier * value);
        }
        self.packed_dirty = true;
    }

    /// Tracked single-entry update, with the same fill-in and flush rules as [`Self::saxpy`]
    pub fn scatter_add(&mut self, index: usize, value: T) {
        debug_assert!(index < self.dimension, "index {} out of bounds", index);
        self.accumulate(index, value);
        self.packed_dirty = true;
    }

    /// Appends `index` to the live list unless it is already listed
    #[inline]
    pub(crate) fn track(&mut self, index: usize) {
        if !self.listed[index] {
            self.listed[index] = true;
            self.non_zero_indices.push(index);
        }
    }

    #[inline]
    fn accumulate(&mut self, index: usize, addend: T) {
        let updated = self.dense_values[index] + addend;
        self.track(index);

        self.dense_values[index] = if updated.magnitude() < TINY {
            T::from_native(ZERO)
        } else {
            updated
        };
    }
}

impl<T: Element> PartialEq for SparseAccumulator<T> {
    /// Structural equality: dimension, live list order, dense contents and tag
    fn eq(&self, other: &Self) -> bool {
        self.dimension == other.dimension
            && self.non_zero_indices == other.non_zero_indices
            && self.dense_values == other.dense_values
            && self.synthetic_tick == other.synthetic_tick
    }
}

impl<T> Index<usize> for SparseAccumulator<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        &self.dense_values[index]
    }
}

impl<T> IndexMut<usize> for SparseAccumulator<T> {
    /// Direct dense write; the live list becomes untrusted
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut T {
        self.live_valid = false;
        &mut self.dense_values[index]
    }
}

impl<T> AddAssign<&SparseAccumulator<T>> for SparseAccumulator<T>
where
    T: Element + AsPrimitive<T>,
{
    fn add_assign(&mut self, rhs: &SparseAccumulator<T>) {
        self.saxpy(T::one(), rhs);
    }
}

impl<T> SubAssign<&SparseAccumulator<T>> for SparseAccumulator<T>
where
    T: Element + AsPrimitive<T>,
{
    fn sub_assign(&mut self, rhs: &SparseAccumulator<T>) {
        self.saxpy(-T::one(), rhs);
    }
}

impl<T: Element> fmt::Display for SparseAccumulator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_live_entries(
            f,
            "Vector",
            self.dimension,
            &self.non_zero_indices,
            |index| self.dense_values[index],
        )
    }
}

impl<T: Element> fmt::Debug for SparseAccumulator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SparseAccumulator")
            .field("dimension", &self.dimension)
            .field("non_zero_indices", &self.non_zero_indices)
            .field("state", &self.state())
            .field("synthetic_tick", &self.synthetic_tick)
            .field("next_link", &self.next_link)
            .finish()
    }
}
