use crate::config::Executor;
use crate::error::SegReduceError;
use crate::ops::segment::element::{SegmentFloat, SegmentIndex};
use crate::ops::segment::layout::{check_len, validate_indices, validate_sorted_ids, OutOfRange};
use crate::ops::segment::mode::ReductionMode;
use crate::ops::segment::rows::{RowBuffer, RowView};
use crate::ops::segment::sorted::reduce_runs;

/// Gathers rows through an index array and reduces them by sorted segment ids.
///
/// Equivalent to running the sorted reducer over `data[indices]`, without
/// materializing the gathered rows.
#[derive(Debug, Clone, Default)]
pub struct SparseSegmentReducer {
    executor: Executor,
}

impl SparseSegmentReducer {
    pub fn new(executor: Executor) -> Self {
        SparseSegmentReducer { executor }
    }

    /// Reduces `data[indices[k]]` into output row `segment_ids[k]`.
    ///
    /// # Arguments
    /// * `data` - `R` source rows.
    /// * `indices` - `I` row ids in `[0, R)`; may repeat and need not be sorted.
    /// * `segment_ids` - `I` non-decreasing ids labelling each gathered row.
    /// * `mode` - `Sum`, `Mean` (divide by the entry count) or `SqrtN` (divide by its root).
    /// * `num_segments` - output row count; derived as `segment_ids[I-1] + 1` when `None`.
    ///   Ids outside `[0, num_segments)` are dropped.
    ///
    /// # Errors
    /// `ShapeMismatch` if `indices` and `segment_ids` differ in length,
    /// `IndexOutOfRange` for an index outside `[0, R)`, and
    /// `MalformedSegmentIds` on a descending id step.
    pub fn reduce<T, I, S>(
        &self,
        data: RowView<'_, T>,
        indices: &[I],
        segment_ids: &[S],
        mode: ReductionMode,
        num_segments: Option<usize>,
    ) -> Result<RowBuffer<T>, SegReduceError>
    where
        T: SegmentFloat,
        I: SegmentIndex,
        S: SegmentIndex,
    {
        let operation = format!("sparse_segment_{}", mode.name());
        check_len(segment_ids.len(), indices.len(), "segment_ids", &operation)?;
        validate_indices(indices, data.rows())?;
        let layout = validate_sorted_ids(segment_ids, num_segments, OutOfRange::Drop)?;

        let dropped = layout.dropped(segment_ids.len());
        if dropped > 0 {
            log::debug!(
                "{}: dropped {} of {} entries with ids outside [0, {})",
                operation,
                dropped,
                segment_ids.len(),
                layout.num_segments
            );
        }

        Ok(reduce_runs(&self.executor, segment_ids, &layout, data.cols(), mode, |k| {
            data.row(indices[k].as_i64() as usize)
        }))
    }
}
