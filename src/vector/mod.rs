// Sparse vector containers

pub mod accumulator;
pub mod precision_sum;
pub mod state;

use std::fmt;

pub use accumulator::SparseAccumulator;
pub use precision_sum::{PrecisionSparseSum, PRESENCE_SENTINEL};
pub use state::StorageState;

/// Diagnostic rendering shared by the containers:
/// `Label(dim=D, nnz=K) { Non-zeros: [(idx: value), ...] }`
pub(crate) fn write_live_entries<T, F>(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    dimension: usize,
    indices: &[usize],
    value_at: F,
) -> fmt::Result
where
    T: fmt::Display,
    F: Fn(usize) -> T,
{
    writeln!(f, "{}(dim={}, nnz={}) {{", label, dimension, indices.len())?;
    write!(f, "  Non-zeros: [")?;
    for (position, &index) in indices.iter().enumerate() {
        if position > 0 {
            write!(f, ", ")?;
        }
        write!(f, "({}: {})", index, value_at(index))?;
    }
    writeln!(f, "]")?;
    write!(f, "}}")
}
