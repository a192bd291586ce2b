use crate::config::ReductionConfig;
use crate::error::SegReduceError;
use crate::ops::segment::{RowView, UnsortedSegmentReducer};
use approx::assert_relative_eq;

#[test]
fn test_unsorted_sum_any_order() -> Result<(), SegReduceError> {
    let data = [1.0_f32, 2.0, 3.0, 4.0];
    let out = UnsortedSegmentReducer::default().reduce(RowView::new(&data, 4, 1)?, &[2i32, 0, 2, 1], 3)?;
    assert_eq!(out.as_slice(), &[2.0, 4.0, 4.0]);
    Ok(())
}

#[test]
fn test_out_of_range_ids_dropped() -> Result<(), SegReduceError> {
    // rows a, b, c with ids -1, 0, 5 and three segments: only b lands.
    let data = [1.0_f64, 1.5, 2.0, 2.5, 3.0, 3.5];
    let out = UnsortedSegmentReducer::default().reduce(RowView::new(&data, 3, 2)?, &[-1i64, 0, 5], 3)?;
    assert_eq!(out.as_slice(), &[2.0, 2.5, 0.0, 0.0, 0.0, 0.0]);
    Ok(())
}

#[test]
fn test_all_ids_dropped() -> Result<(), SegReduceError> {
    let data = [1.0_f32, 2.0];
    let out = UnsortedSegmentReducer::default().reduce(RowView::new(&data, 2, 1)?, &[-3i32, 7], 2)?;
    assert_eq!(out.as_slice(), &[0.0, 0.0]);
    Ok(())
}

#[test]
fn test_zero_segments() -> Result<(), SegReduceError> {
    let data = [1.0_f32, 2.0, 3.0, 4.0];
    let out = UnsortedSegmentReducer::default().reduce(RowView::new(&data, 2, 2)?, &[0i32, 1], 0)?;
    assert_eq!(out.rows(), 0);
    assert!(out.as_slice().is_empty());
    Ok(())
}

#[test]
fn test_length_mismatch() {
    let data = [1.0_f32, 2.0];
    let err = UnsortedSegmentReducer::default()
        .reduce(RowView::new(&data, 2, 1).unwrap(), &[0i32], 2)
        .unwrap_err();
    assert!(matches!(err, SegReduceError::ShapeMismatch { .. }));
}

#[test]
fn test_parallel_matches_sequential() -> Result<(), SegReduceError> {
    let rows = 1_000;
    let cols = 4;
    let data: Vec<f32> = (0..rows * cols).map(|i| ((i * 13) % 29) as f32 * 0.25 - 3.0).collect();
    let ids: Vec<i64> = (0..rows as i64).map(|i| (i * 7919) % 23 - 2).collect();
    let view = RowView::new(&data, rows, cols)?;

    let sequential = UnsortedSegmentReducer::new(ReductionConfig::sequential().build()?)
        .reduce(view, &ids, 20)?;
    for threads in [2, 4, 8] {
        let executor = ReductionConfig::default()
            .with_num_threads(threads)
            .with_parallel_threshold(0)
            .build()?;
        let parallel = UnsortedSegmentReducer::new(executor).reduce(view, &ids, 20)?;
        for (a, e) in parallel.as_slice().iter().zip(sequential.as_slice()) {
            assert_relative_eq!(*a, *e, epsilon = 1e-4);
        }
    }
    Ok(())
}

#[test]
fn test_parallel_large_segment_count() -> Result<(), SegReduceError> {
    // Few rows scattered into a very large output.
    let rows = 1_000;
    let cols = 1;
    let num_segments = 2_000_000;
    let data: Vec<f32> = (0..rows).map(|i| (i % 13) as f32 - 6.0).collect();
    let ids: Vec<i64> = (0..rows as i64).map(|i| (i * 1_999_993) % 2_000_003 - 1).collect();
    let view = RowView::new(&data, rows, cols)?;

    let sequential = UnsortedSegmentReducer::new(ReductionConfig::sequential().build()?)
        .reduce(view, &ids, num_segments)?;
    let executor = ReductionConfig::default()
        .with_num_threads(8)
        .with_parallel_threshold(0)
        .build()?;
    let parallel = UnsortedSegmentReducer::new(executor).reduce(view, &ids, num_segments)?;
    assert_eq!(parallel.rows(), num_segments);
    assert_eq!(parallel.as_slice(), sequential.as_slice());
    Ok(())
}
