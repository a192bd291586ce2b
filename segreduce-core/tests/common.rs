use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use segreduce_core::{Executor, ReductionConfig};

// Shared helpers for the integration tests. Not every test file uses all of them.

#[allow(dead_code)]
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// `rows * cols` standard-normal values.
#[allow(dead_code)]
pub fn random_rows(rng: &mut StdRng, rows: usize, cols: usize) -> Vec<f64> {
    let normal = Normal::new(0.0, 1.0).expect("valid normal distribution");
    (0..rows * cols).map(|_| normal.sample(rng)).collect()
}

/// A non-decreasing id sequence of length `len` with gaps, starting at `first`.
#[allow(dead_code)]
pub fn random_sorted_ids(rng: &mut StdRng, len: usize, first: i64) -> Vec<i64> {
    let mut id = first;
    (0..len)
        .map(|_| {
            if rng.gen_bool(0.3) {
                id += rng.gen_range(1..3);
            }
            id
        })
        .collect()
}

#[allow(dead_code)]
pub fn parallel_executor(threads: usize) -> Executor {
    ReductionConfig::default()
        .with_num_threads(threads)
        .with_parallel_threshold(0)
        .build()
        .expect("thread pool")
}

#[allow(dead_code)]
pub fn sequential_executor() -> Executor {
    ReductionConfig::sequential().build().expect("sequential executor")
}

#[allow(dead_code)]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[allow(dead_code)]
pub fn assert_all_close(actual: &[f64], expected: &[f64], tolerance: f64) {
    assert_eq!(actual.len(), expected.len(), "Data length mismatch");
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (a - e).abs() <= tolerance * (1.0 + e.abs()),
            "Data mismatch at index {}: actual={:?}, expected={:?}",
            i,
            a,
            e
        );
    }
}
