//! Utility functions and helpers

pub mod formats;

pub use formats::{dense_view, from_dense_array, from_sprs_vec, to_sprs_vec};
