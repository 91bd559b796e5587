//! Centralized constants for the hypersparse library
//!
//! This module contains all hardcoded tuning constants used throughout the codebase.
//! All new constants should be added here rather than scattered throughout the code.

// ============================================================================
// NUMERICAL THRESHOLDS
// ============================================================================

/// Magnitude below which a value is treated as numerically negligible
pub const TINY: f64 = 1e-14;

/// Value written in place of an entry flushed as negligible
pub const ZERO: f64 = 0.0;

/// Veltkamp splitting factor `2^27 + 1` for 53-bit significands
pub const VELTKAMP_SPLITTER: f64 = ((1u64 << 27) + 1) as f64;

// ============================================================================
// SPARSITY HEURISTICS
// ============================================================================

/// Numerator of the live density (3/10) below which `clear` zeroes only live entries
pub const SPARSE_CLEAR_NUMERATOR: usize = 3;

/// Denominator of the sparse clear density
pub const SPARSE_CLEAR_DENOMINATOR: usize = 10;

/// Numerator of the live density (1/10) at or below which a rebuild is skipped
pub const REBUILD_SKIP_NUMERATOR: usize = 1;

/// Denominator of the rebuild skip density
pub const REBUILD_SKIP_DENOMINATOR: usize = 10;

// ============================================================================
// WORKSPACE SIZING
// ============================================================================

/// Extra bytes appended to the character workspace beyond the dimension
pub const CHAR_WORKSPACE_PADDING: usize = 6400;

/// Integer workspace length as a multiple of the dimension
pub const INTEGER_WORKSPACE_FACTOR: usize = 4;

/// Returns true when `live` entries out of `dimension` are few enough that
/// zeroing them one by one beats resetting the whole dense array
#[inline]
pub fn prefers_sparse_clear(live: usize, dimension: usize) -> bool {
    SPARSE_CLEAR_DENOMINATOR * live < SPARSE_CLEAR_NUMERATOR * dimension
}

/// Returns true when a tracked live count is small enough that a full
/// rescan of the dense array is not worth doing
#[inline]
pub fn skips_rebuild(live: usize, dimension: usize) -> bool {
    REBUILD_SKIP_DENOMINATOR * live <= REBUILD_SKIP_NUMERATOR * dimension
}
