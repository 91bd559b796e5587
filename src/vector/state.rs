//! Bookkeeping state of a sparse container
//!
//! A container keeps three views of the same data: the dense array, the live
//! index list and the packed `(index, value)` cache. They drift apart in two
//! ways, and [`StorageState`] names the result:
//!
//! ```text
//!                 scatter-add / saxpy
//!   Consistent ───────────────────────▶ PackedStale
//!       ▲                                   │
//!       │        create_packed_storage      │
//!       └───────────────────────────────────┘
//!
//!   any state ── direct dense write ──▶ Invalidated
//!   Invalidated ── rebuild_indices_from_dense ──▶ PackedStale
//!   any state ── clear / setup ──▶ Consistent
//! ```
//!
//! While `Invalidated`, the live list no longer describes the dense array and
//! sparsity-dependent operations must not be trusted until a rebuild.

/// Consistency of the live index list and packed cache with the dense array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageState {
    /// Live list and packed cache both describe the dense array
    #[default]
    Consistent,
    /// Live list is accurate; packed cache predates the last tracked update
    PackedStale,
    /// Dense array was written directly; live list may be wrong
    Invalidated,
}

impl StorageState {
    /// Combines the two independent flags a container tracks
    #[inline]
    pub(crate) fn from_flags(live_valid: bool, packed_dirty: bool) -> Self {
        match (live_valid, packed_dirty) {
            (false, _) => StorageState::Invalidated,
            (true, true) => StorageState::PackedStale,
            (true, false) => StorageState::Consistent,
        }
    }

    /// Whether the live index list can be relied on
    #[inline]
    pub fn is_tracked(&self) -> bool {
        !matches!(self, StorageState::Invalidated)
    }
}
