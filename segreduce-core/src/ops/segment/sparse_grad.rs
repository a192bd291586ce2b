use crate::config::Executor;
use crate::error::SegReduceError;
use crate::ops::segment::element::{SegmentFloat, SegmentIndex};
use crate::ops::segment::layout::{check_len, exclusive_bound, segment_counts, validate_indices};
use crate::ops::segment::mode::ReductionMode;
use crate::ops::segment::rows::{RowBuffer, RowView};
use crate::ops::segment::scatter::{scatter_rows, Contribution};

/// Gradient of the sparse segment reduction with respect to its source rows.
///
/// Each forward contribution `(indices[k], segment_ids[k])` sends the upstream
/// gradient row of its segment back to its source row, scaled by the
/// derivative of the forward normalization. Contributions add up, so repeated
/// indices accumulate and unreferenced source rows stay zero.
#[derive(Debug, Clone, Default)]
pub struct SparseSegmentGradReducer {
    executor: Executor,
}

impl SparseSegmentGradReducer {
    pub fn new(executor: Executor) -> Self {
        SparseSegmentGradReducer { executor }
    }

    /// Scatters `grad` (one row per segment) back onto `output_dim0` source rows.
    ///
    /// The segment count is `grad.rows()`; a caller that knows the forward
    /// segment count passes it as `num_segments` to have it checked. Ids outside `[0, grad.rows())` are
    /// dropped; ids need not be sorted. `Mean` and `SqrtN` divide by the number of
    /// entries carrying the same id (or its square root), which is exactly the
    /// count the forward reduction used.
    ///
    /// # Errors
    /// `ShapeMismatch` if `indices` and `segment_ids` differ in length or
    /// `grad` does not have `num_segments` rows, and `IndexOutOfRange` for an
    /// index outside `[0, output_dim0)`.
    pub fn reduce<T, I, S>(
        &self,
        grad: RowView<'_, T>,
        indices: &[I],
        segment_ids: &[S],
        mode: ReductionMode,
        output_dim0: usize,
        num_segments: Option<usize>,
    ) -> Result<RowBuffer<T>, SegReduceError>
    where
        T: SegmentFloat,
        I: SegmentIndex,
        S: SegmentIndex,
    {
        let operation = format!("sparse_segment_{}_grad", mode.name());
        check_len(segment_ids.len(), indices.len(), "segment_ids", &operation)?;
        if let Some(expected) = num_segments {
            check_len(grad.rows(), expected, "gradient rows", &operation)?;
        }
        validate_indices(indices, output_dim0)?;

        let num_segments = grad.rows();
        let (counts, dropped) = segment_counts(segment_ids, num_segments);
        if dropped > 0 {
            log::debug!(
                "{}: dropped {} of {} entries with ids outside [0, {})",
                operation,
                dropped,
                segment_ids.len(),
                num_segments
            );
        }
        let scales: Vec<T::Acc> = counts.iter().map(|&c| mode.gradient_scale::<T>(c)).collect();

        let cols = grad.cols();
        let bound = exclusive_bound(num_segments);
        let acc = scatter_rows::<T, _>(&self.executor, indices.len(), output_dim0, cols, |k| {
            let segment = segment_ids[k].as_i64();
            if segment < 0 || segment >= bound {
                return None;
            }
            let segment = segment as usize;
            Some(Contribution {
                target: indices[k].as_i64() as usize,
                row: grad.row(segment),
                scale: scales[segment],
            })
        });
        Ok(RowBuffer::from_acc(acc, output_dim0, cols))
    }
}
