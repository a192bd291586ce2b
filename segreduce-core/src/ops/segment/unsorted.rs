use crate::config::Executor;
use crate::error::SegReduceError;
use crate::ops::segment::element::{SegmentFloat, SegmentIndex};
use crate::ops::segment::layout::{check_len, count_out_of_range, exclusive_bound};
use crate::ops::segment::rows::{RowBuffer, RowView};
use crate::ops::segment::scatter::{scatter_rows, Contribution};
use num_traits::One;

/// Sums rows grouped by an arbitrary id sequence into a fixed number of segments.
///
/// Ids outside `[0, num_segments)` (including negative ids) mask their rows out
/// of the reduction: they are counted and logged, never reported as errors.
#[derive(Debug, Clone, Default)]
pub struct UnsortedSegmentReducer {
    executor: Executor,
}

impl UnsortedSegmentReducer {
    pub fn new(executor: Executor) -> Self {
        UnsortedSegmentReducer { executor }
    }

    /// Computes `out[g] = sum(data[i] for i where segment_ids[i] == g)` for `g in [0, num_segments)`.
    ///
    /// # Errors
    /// `ShapeMismatch` if the id count differs from the row count.
    pub fn reduce<T, I>(
        &self,
        data: RowView<'_, T>,
        segment_ids: &[I],
        num_segments: usize,
    ) -> Result<RowBuffer<T>, SegReduceError>
    where
        T: SegmentFloat,
        I: SegmentIndex,
    {
        check_len(segment_ids.len(), data.rows(), "segment_ids", "unsorted_segment_sum")?;

        let dropped = count_out_of_range(segment_ids, num_segments);
        if dropped > 0 {
            log::debug!(
                "unsorted_segment_sum: dropped {} of {} rows with ids outside [0, {})",
                dropped,
                segment_ids.len(),
                num_segments
            );
        }

        let cols = data.cols();
        let bound = exclusive_bound(num_segments);
        let acc = scatter_rows::<T, _>(&self.executor, data.rows(), num_segments, cols, |i| {
            let id = segment_ids[i].as_i64();
            if id < 0 || id >= bound {
                return None;
            }
            Some(Contribution {
                target: id as usize,
                row: data.row(i),
                scale: T::Acc::one(),
            })
        });
        Ok(RowBuffer::from_acc(acc, num_segments, cols))
    }
}
