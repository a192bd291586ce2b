use crate::config::{Executor, ReductionConfig};
use crate::error::SegReduceError;
use crate::ops::segment::{ReductionMode, RowView, SortedSegmentReducer};
use approx::assert_relative_eq;

fn parallel_executor() -> Executor {
    ReductionConfig::default()
        .with_num_threads(4)
        .with_parallel_threshold(0)
        .build()
        .unwrap()
}

#[test]
fn test_segment_sum_basic() -> Result<(), SegReduceError> {
    let data = [1.0_f32, 2.0, 3.0, 4.0, 5.0, 6.0];
    let out = SortedSegmentReducer::default().reduce(
        RowView::new(&data, 3, 2)?,
        &[0i32, 0, 1],
        ReductionMode::Sum,
        None,
    )?;
    assert_eq!(out.rows(), 2);
    assert_eq!(out.as_slice(), &[4.0, 6.0, 5.0, 6.0]);
    Ok(())
}

#[test]
fn test_segment_mean_basic() -> Result<(), SegReduceError> {
    let data = [1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0];
    let out = SortedSegmentReducer::default().reduce(
        RowView::new(&data, 3, 2)?,
        &[0i64, 0, 1],
        ReductionMode::Mean,
        None,
    )?;
    assert_eq!(out.as_slice(), &[2.0, 3.0, 5.0, 6.0]);
    Ok(())
}

#[test]
fn test_empty_group_is_zero() -> Result<(), SegReduceError> {
    let data = [1.0_f32, 2.0, 3.0];
    for mode in [ReductionMode::Sum, ReductionMode::Mean, ReductionMode::SqrtN] {
        let out = SortedSegmentReducer::default().reduce(RowView::new(&data, 3, 1)?, &[0i32, 0, 2], mode, None)?;
        assert_eq!(out.rows(), 3);
        assert_eq!(out.row(1), &[0.0]);
    }
    Ok(())
}

#[test]
fn test_mean_single_row_identity() -> Result<(), SegReduceError> {
    let data = [0.3_f32, -1.7, 2.5, 9.0];
    let out = SortedSegmentReducer::default().reduce(
        RowView::new(&data, 2, 2)?,
        &[0i32, 1],
        ReductionMode::Mean,
        None,
    )?;
    assert_eq!(out.as_slice(), &data);
    Ok(())
}

#[test]
fn test_sqrtn_is_sum_over_root_count() -> Result<(), SegReduceError> {
    let data = [1.0_f64, 2.0, 3.0, 4.0, 10.0];
    let ids = [0i32, 0, 0, 0, 1];
    let reducer = SortedSegmentReducer::default();
    let sum = reducer.reduce(RowView::new(&data, 5, 1)?, &ids, ReductionMode::Sum, None)?;
    let sqrtn = reducer.reduce(RowView::new(&data, 5, 1)?, &ids, ReductionMode::SqrtN, None)?;
    assert_relative_eq!(sqrtn.row(0)[0], sum.row(0)[0] / 2.0, epsilon = 1e-12);
    assert_relative_eq!(sqrtn.row(1)[0], 10.0, epsilon = 1e-12);
    Ok(())
}

#[test]
fn test_descending_ids_rejected() {
    let data = [1.0_f32, 2.0, 3.0];
    let err = SortedSegmentReducer::default()
        .reduce(RowView::new(&data, 3, 1).unwrap(), &[0i32, 2, 1], ReductionMode::Sum, None)
        .unwrap_err();
    assert_eq!(
        err,
        SegReduceError::MalformedSegmentIds { position: 2, previous: 2, current: 1 }
    );
}

#[test]
fn test_negative_id_rejected() {
    let data = [1.0_f32, 2.0];
    let err = SortedSegmentReducer::default()
        .reduce(RowView::new(&data, 2, 1).unwrap(), &[-1i64, 0], ReductionMode::Sum, None)
        .unwrap_err();
    assert!(matches!(err, SegReduceError::SegmentIdOutOfRange { position: 0, id: -1, .. }));
}

#[test]
fn test_id_beyond_explicit_count_rejected() {
    let data = [1.0_f32, 2.0];
    let err = SortedSegmentReducer::default()
        .reduce(RowView::new(&data, 2, 1).unwrap(), &[0i32, 4], ReductionMode::Sum, Some(3))
        .unwrap_err();
    assert!(matches!(err, SegReduceError::SegmentIdOutOfRange { position: 1, id: 4, .. }));
}

#[test]
fn test_length_mismatch() {
    let data = [1.0_f32, 2.0, 3.0, 4.0];
    let err = SortedSegmentReducer::default()
        .reduce(RowView::new(&data, 2, 2).unwrap(), &[0i32, 0, 1], ReductionMode::Sum, None)
        .unwrap_err();
    assert!(matches!(err, SegReduceError::ShapeMismatch { .. }));
}

#[test]
fn test_explicit_count_with_no_rows() -> Result<(), SegReduceError> {
    let data: [f32; 0] = [];
    let ids: [i32; 0] = [];
    let out = SortedSegmentReducer::default().reduce(RowView::new(&data, 0, 3)?, &ids, ReductionMode::Mean, Some(2))?;
    assert_eq!(out.rows(), 2);
    assert_eq!(out.cols(), 3);
    assert!(out.as_slice().iter().all(|&v| v == 0.0));
    Ok(())
}

#[test]
fn test_no_rows_derived_count() -> Result<(), SegReduceError> {
    let data: [f64; 0] = [];
    let ids: [i64; 0] = [];
    let out = SortedSegmentReducer::default().reduce(RowView::new(&data, 0, 4)?, &ids, ReductionMode::Sum, None)?;
    assert_eq!(out.rows(), 0);
    Ok(())
}

#[test]
fn test_explicit_count_trailing_groups() -> Result<(), SegReduceError> {
    let data = [1.0_f32, 2.0];
    let out = SortedSegmentReducer::default().reduce(RowView::new(&data, 2, 1)?, &[1i32, 1], ReductionMode::Sum, Some(4))?;
    assert_eq!(out.as_slice(), &[0.0, 3.0, 0.0, 0.0]);
    Ok(())
}

#[test]
fn test_f32_accumulates_wide() -> Result<(), SegReduceError> {
    let rows = 100_000;
    let data = vec![0.1_f32; rows];
    let ids = vec![0i32; rows];
    let out = SortedSegmentReducer::new(Executor::default()).reduce(
        RowView::new(&data, rows, 1)?,
        &ids,
        ReductionMode::Sum,
        None,
    )?;
    assert_relative_eq!(out.row(0)[0], 10_000.0, epsilon = 1e-2);
    Ok(())
}

#[test]
fn test_parallel_matches_sequential() -> Result<(), SegReduceError> {
    let rows = 257;
    let cols = 3;
    let data: Vec<f64> = (0..rows * cols).map(|i| ((i * 37) % 101) as f64 - 50.0).collect();
    let ids: Vec<i32> = (0..rows as i32).map(|i| i / 7 + (i / 50) * 3).collect();
    let view = RowView::new(&data, rows, cols)?;

    let sequential = SortedSegmentReducer::new(ReductionConfig::sequential().build()?);
    let parallel = SortedSegmentReducer::new(parallel_executor());
    for mode in [ReductionMode::Sum, ReductionMode::Mean, ReductionMode::SqrtN] {
        let expected = sequential.reduce(view, &ids, mode, Some(80))?;
        let actual = parallel.reduce(view, &ids, mode, Some(80))?;
        assert_eq!(expected.rows(), actual.rows());
        for (a, e) in actual.as_slice().iter().zip(expected.as_slice()) {
            assert_relative_eq!(*a, *e, epsilon = 1e-9);
        }
    }
    Ok(())
}

#[test]
fn test_parallel_skewed_segment() -> Result<(), SegReduceError> {
    // One segment covers almost every row, so it crosses every partition boundary.
    let rows = 10_003;
    let cols = 2;
    let data: Vec<f32> = (0..rows * cols).map(|i| ((i * 11) % 23) as f32 * 0.125 - 1.0).collect();
    let mut ids = vec![0i64; 10_000];
    ids.extend([3, 3, 7]);
    let view = RowView::new(&data, rows, cols)?;

    let sequential = SortedSegmentReducer::new(ReductionConfig::sequential().build()?);
    let parallel = SortedSegmentReducer::new(parallel_executor());
    for mode in [ReductionMode::Sum, ReductionMode::Mean, ReductionMode::SqrtN] {
        let expected = sequential.reduce(view, &ids, mode, None)?;
        let actual = parallel.reduce(view, &ids, mode, None)?;
        assert_eq!(actual.rows(), 8);
        for (a, e) in actual.as_slice().iter().zip(expected.as_slice()) {
            assert_relative_eq!(*a, *e, epsilon = 1e-4, max_relative = 1e-6);
        }
        assert_eq!(&actual.as_slice()[2..6], &[0.0; 4]);
    }
    Ok(())
}

#[test]
fn test_parallel_all_rows_one_segment() -> Result<(), SegReduceError> {
    let rows = 4_096;
    let data = vec![1.0_f64; rows];
    let ids = vec![2i32; rows];
    let out = SortedSegmentReducer::new(parallel_executor()).reduce(
        RowView::new(&data, rows, 1)?,
        &ids,
        ReductionMode::Mean,
        Some(4),
    )?;
    assert_eq!(out.as_slice(), &[0.0, 0.0, 1.0, 0.0]);

    let sum = SortedSegmentReducer::new(parallel_executor()).reduce(
        RowView::new(&data, rows, 1)?,
        &ids,
        ReductionMode::Sum,
        Some(4),
    )?;
    assert_eq!(sum.as_slice(), &[0.0, 0.0, 4_096.0, 0.0]);
    Ok(())
}
