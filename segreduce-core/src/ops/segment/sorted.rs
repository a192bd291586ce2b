use crate::config::Executor;
use crate::error::SegReduceError;
use crate::ops::segment::element::{SegmentFloat, SegmentIndex};
use crate::ops::segment::layout::{
    check_len, is_run_start, partition_runs, validate_sorted_ids, OutOfRange, SortedLayout,
};
use crate::ops::segment::mode::ReductionMode;
use crate::ops::segment::rows::{accumulate_row, flush_row, merge_partials, reset, RowBuffer, RowView};
use num_traits::Zero;
use rayon::prelude::*;

/// Reduces contiguous runs of rows grouped by a non-decreasing id sequence.
///
/// Output row `g` combines every row `i` with `segment_ids[i] == g`; groups that
/// never occur stay zero.
#[derive(Debug, Clone, Default)]
pub struct SortedSegmentReducer {
    executor: Executor,
}

impl SortedSegmentReducer {
    pub fn new(executor: Executor) -> Self {
        SortedSegmentReducer { executor }
    }

    /// Reduces `data` by `segment_ids`.
    ///
    /// # Arguments
    /// * `data` - `R` rows to reduce.
    /// * `segment_ids` - `R` non-decreasing, non-negative ids.
    /// * `mode` - how each run is combined.
    /// * `num_segments` - output row count; derived as `segment_ids[R-1] + 1` when `None`.
    ///
    /// # Errors
    /// `ShapeMismatch` if the id count differs from the row count,
    /// `MalformedSegmentIds` on a descending step, and `SegmentIdOutOfRange`
    /// for negative ids or ids beyond an explicit `num_segments`.
    pub fn reduce<T, I>(
        &self,
        data: RowView<'_, T>,
        segment_ids: &[I],
        mode: ReductionMode,
        num_segments: Option<usize>,
    ) -> Result<RowBuffer<T>, SegReduceError>
    where
        T: SegmentFloat,
        I: SegmentIndex,
    {
        check_len(segment_ids.len(), data.rows(), "segment_ids", "sorted_segment_reduce")?;
        let layout = validate_sorted_ids(segment_ids, num_segments, OutOfRange::Reject)?;
        log::trace!(
            "sorted_segment_{}: {} rows x {} cols into {} segments",
            mode.name(),
            data.rows(),
            data.cols(),
            layout.num_segments
        );

        Ok(reduce_runs(&self.executor, segment_ids, &layout, data.cols(), mode, |k| data.row(k)))
    }
}

/// Splits per worker thread for the parallel run kernel.
const PARTS_PER_THREAD: usize = 4;

/// Partial sum of the leading run fragment of a part, owned by an earlier part.
struct Fragment<A> {
    segment: i64,
    acc: Vec<A>,
    count: usize,
}

/// Run-aggregation kernel shared by the sorted and sparse reducers.
///
/// Entry `k` in `[layout.start, layout.end)` contributes `row_at(k)` to output row
/// `segment_ids[k]`. The kept window is cut into equal position ranges that
/// ignore run boundaries, so one long segment still spreads over every worker.
/// Each range flushes the runs that start inside it into its own block of
/// output rows. A run that continues past the end of its range picks up the
/// partial sums of the following ranges' leading fragments before it is
/// flushed. Small inputs use a single range and never leave the calling thread.
pub(crate) fn reduce_runs<'a, T, I, F>(
    executor: &Executor,
    segment_ids: &[I],
    layout: &SortedLayout,
    cols: usize,
    mode: ReductionMode,
    row_at: F,
) -> RowBuffer<T>
where
    T: SegmentFloat,
    I: SegmentIndex,
    F: Fn(usize) -> &'a [T] + Sync,
{
    let num_segments = layout.num_segments;
    let mut out = RowBuffer::<T>::zeros(num_segments, cols);
    if cols == 0 || layout.entries() == 0 {
        return out;
    }

    let parallel = executor.is_parallel(layout.entries() * cols);
    let parts = if parallel {
        executor.current_num_threads() * PARTS_PER_THREAD
    } else {
        1
    };
    let partition = partition_runs(segment_ids, layout, parts);

    let leading_fragment = |part: usize| -> Option<Fragment<T::Acc>> {
        let (lo, hi) = (partition.bounds[part], partition.bounds[part + 1]);
        if is_run_start(segment_ids, layout, lo) {
            return None;
        }
        let segment = segment_ids[lo].as_i64();
        let mut acc = vec![T::Acc::zero(); cols];
        let mut q = lo;
        while q < hi && segment_ids[q].as_i64() == segment {
            accumulate_row(&mut acc, row_at(q));
            q += 1;
        }
        Some(Fragment { segment, acc, count: q - lo })
    };

    let reduce_part = |part: usize, block: &mut [T], fragments: &[Option<Fragment<T::Acc>>]| {
        let (lo, hi) = (partition.bounds[part], partition.bounds[part + 1]);
        let first_row = partition.first_rows[part];
        let mut q = lo;
        if !is_run_start(segment_ids, layout, lo) {
            let carried = segment_ids[lo].as_i64();
            while q < hi && segment_ids[q].as_i64() == carried {
                q += 1;
            }
        }
        let mut acc = vec![T::Acc::zero(); cols];
        while q < hi {
            let segment = segment_ids[q].as_i64();
            let run_start = q;
            while q < hi && segment_ids[q].as_i64() == segment {
                accumulate_row(&mut acc, row_at(q));
                q += 1;
            }
            let mut count = q - run_start;
            if q == hi {
                for fragment in fragments.iter().skip(part + 1) {
                    match fragment {
                        Some(f) if f.segment == segment => {
                            merge_partials(&mut acc, &f.acc);
                            count += f.count;
                        }
                        _ => break,
                    }
                }
            }
            let row = segment as usize - first_row;
            flush_row(&mut block[row * cols..(row + 1) * cols], &acc, mode, count);
            reset(&mut acc);
        }
    };

    // Ownership hands every part a disjoint block of output rows.
    let mut blocks: Vec<&mut [T]> = Vec::with_capacity(partition.parts());
    let mut rest = out.as_mut_slice();
    for part in 0..partition.parts() {
        let rows = partition.first_rows[part + 1] - partition.first_rows[part];
        let (block, tail) = std::mem::take(&mut rest).split_at_mut(rows * cols);
        blocks.push(block);
        rest = tail;
    }

    if partition.parts() == 1 {
        for block in blocks {
            reduce_part(0, block, &[]);
        }
        return out;
    }

    log::debug!(
        "reduce_runs: {} parts over {} segments on {} threads",
        partition.parts(),
        num_segments,
        executor.current_num_threads()
    );
    executor.install(|| {
        let fragments: Vec<Option<Fragment<T::Acc>>> =
            (0..partition.parts()).into_par_iter().map(leading_fragment).collect();
        blocks
            .into_par_iter()
            .enumerate()
            .for_each(|(part, block)| reduce_part(part, block, &fragments));
    });
    out
}
