//! Integration tests for the generic hyper-sparse accumulator

use hypersparse::constants::TINY;
use hypersparse::{CompensatedScalar, SparseAccumulator, StorageState};

const DIMENSION: usize = 10;

fn vector_from(entries: &[(usize, f64)]) -> SparseAccumulator<f64> {
    let mut vector = SparseAccumulator::new(DIMENSION);
    for &(index, value) in entries {
        vector.scatter_add(index, value);
    }
    vector
}

#[test]
fn test_initialization() {
    let vector = SparseAccumulator::<f64>::new(DIMENSION);
    assert_eq!(vector.dimension(), DIMENSION);
    assert_eq!(vector.live_count(), 0);
    assert_eq!(vector.dense_values().len(), DIMENSION);
    assert!(vector.capacity() >= DIMENSION);
    assert_eq!(vector.state(), StorageState::Consistent);
    assert_eq!(vector.tag(), 0.0);
    assert!(vector.iter().all(|&value| value == 0.0));
}

#[test]
fn test_scatter_add_tracks_insertion_order() {
    let mut vector = SparseAccumulator::<f64>::new(100);
    vector.scatter_add(10, 5.5);
    vector.scatter_add(20, 10.2);

    assert_eq!(vector.get(10), 5.5);
    assert_eq!(vector.get(20), 10.2);
    assert_eq!(vector.get(30), 0.0);
    assert_eq!(vector.live_indices(), &[10, 20]);
}

#[test]
fn test_clear_sparse_path() {
    let mut vector = vector_from(&[(1, 5.0), (3, 10.0)]);
    vector.clear();

    assert_eq!(vector.live_count(), 0);
    assert_eq!(vector.get(1), 0.0);
    assert_eq!(vector.get(3), 0.0);
}

#[test]
fn test_clear_dense_path() {
    let mut vector = vector_from(&[(0, 1.0), (2, 1.0), (4, 1.0), (6, 1.0), (9, 2.0)]);
    vector.clear();

    assert_eq!(vector.live_count(), 0);
    assert!(vector.iter().all(|&value| value == 0.0));
}

#[test]
fn test_clear_resets_tag_and_link() {
    let mut vector = vector_from(&[(1, 1.0)]);
    vector.set_tag(3.5);
    vector.set_next_link(Some(7));
    vector.clear();
    assert_eq!(vector.tag(), 0.0);
    assert_eq!(vector.next_link(), None);
}

#[test]
fn test_prune_small_values_keeps_order() {
    let mut vector = vector_from(&[(0, 1.0), (1, 0.5), (2, 5.0)]);
    vector.scatter_add(1, -0.5 + TINY * 0.1);

    vector.prune_small_values();
    assert_eq!(vector.live_indices(), &[0, 2]);
    assert_eq!(vector.get(1), 0.0);
}

#[test]
fn test_prune_below_custom_threshold() {
    let mut vector = vector_from(&[(0, 1.0), (4, 1e-3), (7, -2.0)]);
    vector.prune_below(1e-2);
    assert_eq!(vector.live_indices(), &[0, 7]);
    assert_eq!(vector.get(4), 0.0);
}

#[test]
fn test_create_packed_storage() {
    let mut vector = vector_from(&[(2, 10.0), (5, 20.0)]);
    assert_eq!(vector.state(), StorageState::PackedStale);

    vector.create_packed_storage();
    assert_eq!(vector.state(), StorageState::Consistent);

    let (indices, values) = vector.packed();
    assert_eq!(indices, &[2, 5]);
    assert_eq!(values, &[10.0, 20.0]);
}

#[test]
fn test_packed_storage_is_lazy() {
    let mut vector = vector_from(&[(2, 10.0)]);
    vector.create_packed_storage();

    // Direct write does not refresh the packed cache
    vector[2] = 99.0;
    vector.create_packed_storage();
    assert_eq!(vector.packed().1, &[10.0]);
}

#[test]
fn test_rebuild_indices_from_dense() {
    let mut vector = SparseAccumulator::<f64>::new(DIMENSION);
    vector[2] = 5.0;
    vector[8] = -3.0;
    assert_eq!(vector.state(), StorageState::Invalidated);

    vector.rebuild_indices_from_dense();
    assert_eq!(vector.live_indices(), &[2, 8]);
    assert!(vector.state().is_tracked());
}

#[test]
fn test_rebuild_after_bulk_dense_write() {
    let mut vector = SparseAccumulator::<f64>::new(DIMENSION);
    for (index, value) in vector.iter_mut().enumerate() {
        if index % 3 == 0 {
            *value = index as f64 + 1.0;
        }
    }
    vector.rebuild_indices_from_dense();
    assert_eq!(vector.live_indices(), &[0, 3, 6, 9]);
}

#[test]
fn test_copy_from_same_type() {
    let mut source = vector_from(&[(1, 42.0)]);
    source.set_tag(123.456);

    let mut target = SparseAccumulator::<f64>::new(DIMENSION);
    target.scatter_add(5, 1.0);
    target.copy_from(&source);

    assert!(target == source);
    assert_eq!(target.get(1), 42.0);
    assert_eq!(target.get(5), 0.0);
    assert_eq!(target.tag(), 123.456);
}

#[test]
fn test_copy_from_widens_to_compensated() {
    let source = vector_from(&[(3, 0.25), (6, -4.0)]);

    let mut target = SparseAccumulator::<CompensatedScalar>::new(DIMENSION);
    target.copy_from(&source);

    assert_eq!(target.live_indices(), &[3, 6]);
    assert_eq!(target.get(3), 0.25);
    assert_eq!(target.get(6), -4.0);
}

#[test]
fn test_copy_from_narrows_compensated() {
    let mut source = SparseAccumulator::<CompensatedScalar>::new(DIMENSION);
    source.scatter_add(4, CompensatedScalar::from_parts(1.0, 1e-20));

    let mut target = SparseAccumulator::<f32>::new(DIMENSION);
    target.copy_from(&source);
    assert_eq!(target.get(4), 1.0f32);
}

#[test]
fn test_copy_from_resizes_target() {
    let source = vector_from(&[(9, 1.0)]);
    let mut target = SparseAccumulator::<f64>::new(3);
    target.copy_from(&source);
    assert_eq!(target.dimension(), DIMENSION);
    assert_eq!(target.get(9), 1.0);
}

#[test]
fn test_squared_euclidean_norm() {
    let vector = vector_from(&[(1, 3.0), (2, 4.0)]);
    assert_eq!(vector.squared_euclidean_norm(), 25.0);
}

#[test]
fn test_saxpy_operation() {
    let pivot = vector_from(&[(1, 2.0), (3, 4.0)]);
    let mut target = vector_from(&[(1, 10.0), (2, 5.0)]);

    target.saxpy(0.5, &pivot);

    assert_eq!(target.get(1), 11.0);
    assert_eq!(target.get(2), 5.0);
    assert_eq!(target.get(3), 2.0);
    assert_eq!(target.live_indices(), &[1, 2, 3]);
}

#[test]
fn test_saxpy_cost_ignores_untouched_target_entries() {
    let mut target = SparseAccumulator::<f64>::new(1_000);
    for index in 0..500 {
        target.scatter_add(index, 1.0);
    }
    let mut x = SparseAccumulator::<f64>::new(1_000);
    x.scatter_add(999, 3.0);

    target.saxpy(2.0, &x);
    assert_eq!(target.live_count(), 501);
    assert_eq!(*target.live_indices().last().unwrap(), 999);
    assert_eq!(target.get(999), 6.0);
}

#[test]
fn test_saxpy_flushes_tiny_results() {
    let x = vector_from(&[(4, 1.0)]);
    let mut target = vector_from(&[(4, 1.0)]);

    target.saxpy(-1.0, &x);
    assert_eq!(target.get(4), 0.0);
    // No sentinel in the generic container
    assert_eq!(target.live_indices(), &[4]);
}

#[test]
fn test_saxpy_cancel_then_refill_keeps_norm() {
    let mut y = vector_from(&[(1, 1.0)]);
    let x = vector_from(&[(1, 1.0)]);

    y.saxpy(-1.0, &x);
    y.saxpy(3.0, &x);

    assert_eq!(y.live_indices(), &[1]);
    assert_eq!(y.squared_euclidean_norm(), 9.0);
    assert!(y == vector_from(&[(1, 3.0)]));
}

#[test]
fn test_saxpy_mixed_precision_source() {
    // Below TINY, so it has to bypass the flushing scatter-add
    let mut x = SparseAccumulator::<f64>::new(DIMENSION);
    x[0] = 1e-17;
    x.rebuild_indices_from_dense();
    assert_eq!(x.live_indices(), &[0]);

    let mut target = SparseAccumulator::<CompensatedScalar>::new(DIMENSION);
    target.scatter_add(0, CompensatedScalar::new(1.0));

    target.saxpy(CompensatedScalar::ONE, &x);
    let recovered = target.get(0) - 1.0;
    let diff: f64 = (recovered.to_f64() - 1e-17).abs();
    assert!(diff < 1e-30);
}

#[test]
fn test_add_and_sub_assign() {
    let x = vector_from(&[(1, 2.0), (5, 3.0)]);
    let mut target = vector_from(&[(1, 1.0)]);

    target += &x;
    assert_eq!(target.get(1), 3.0);
    assert_eq!(target.get(5), 3.0);

    target -= &x;
    assert_eq!(target.get(1), 1.0);
    assert_eq!(target.get(5), 0.0);
}

#[test]
fn test_equality_check() {
    let mut a = SparseAccumulator::<f64>::new(DIMENSION);
    let b = SparseAccumulator::<f64>::new(DIMENSION);
    assert!(a == b);

    a.scatter_add(0, 1.0);
    assert!(a != b);
}

#[test]
fn test_equality_sensitive_to_every_field() {
    let base = vector_from(&[(1, 1.0), (2, 2.0)]);

    let reordered = vector_from(&[(2, 2.0), (1, 1.0)]);
    assert!(base != reordered);

    let mut tagged = base.clone();
    tagged.set_tag(1.0);
    assert!(base != tagged);

    let mut resized = SparseAccumulator::<f64>::new(DIMENSION + 1);
    resized.scatter_add(1, 1.0);
    resized.scatter_add(2, 2.0);
    assert!(base != resized);

    let mut changed = base.clone();
    changed.scatter_add(2, 1.0);
    assert!(base != changed);
}

#[test]
fn test_equality_independent_of_history() {
    let direct = vector_from(&[(1, 3.0), (2, 2.0)]);
    let incremental = vector_from(&[(1, 1.0), (2, 2.0), (1, 2.0)]);
    assert!(direct == incremental);
}

#[test]
fn test_clone_is_deep() {
    let original = vector_from(&[(1, 1.0)]);
    let mut copy = original.clone();
    copy.scatter_add(1, 1.0);
    assert_eq!(original.get(1), 1.0);
    assert_eq!(copy.get(1), 2.0);
}

#[test]
fn test_next_link_threads_a_pool() {
    let mut pool: Vec<SparseAccumulator<f64>> =
        (0..3).map(|_| SparseAccumulator::new(DIMENSION)).collect();
    pool[0].set_next_link(Some(2));
    pool[2].set_next_link(Some(1));

    let mut order = vec![0];
    let mut cursor = pool[0].next_link();
    while let Some(slot) = cursor {
        order.push(slot);
        cursor = pool[slot].next_link();
    }
    assert_eq!(order, vec![0, 2, 1]);
}

#[test]
fn test_display_format() {
    let vector = vector_from(&[(1, 10.0), (5, 20.0)]);
    let output = vector.to_string();

    assert!(output.contains("Vector(dim=10, nnz=2)"));
    assert!(output.contains("(1: 10)"));
    assert!(output.contains("(5: 20)"));
}
