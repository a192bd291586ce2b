use crate::config::Executor;
use crate::error::SegReduceError;
use crate::ops::segment::{self, ReductionMode};
use crate::tensor::Tensor;

impl Tensor {
    /// Sums runs of rows sharing a (non-decreasing) segment id.
    /// Delegates to `ops::segment::segment_sum_op`.
    pub fn segment_sum(&self, segment_ids: &Tensor) -> Result<Tensor, SegReduceError> {
        segment::segment_sum_op(self, segment_ids)
    }

    /// Averages runs of rows sharing a (non-decreasing) segment id.
    /// Delegates to `ops::segment::segment_mean_op`.
    pub fn segment_mean(&self, segment_ids: &Tensor) -> Result<Tensor, SegReduceError> {
        segment::segment_mean_op(self, segment_ids)
    }

    /// Sorted segment reduction with an explicit mode, segment count and executor.
    pub fn segment_reduce(
        &self,
        segment_ids: &Tensor,
        mode: ReductionMode,
        num_segments: Option<usize>,
        executor: &Executor,
    ) -> Result<Tensor, SegReduceError> {
        segment::segment_reduce_op(self, segment_ids, mode, num_segments, executor)
    }

    /// Sums rows into `num_segments` groups by arbitrary ids.
    /// Delegates to `ops::segment::unsorted_segment_sum_op`.
    pub fn unsorted_segment_sum(&self, segment_ids: &Tensor, num_segments: usize) -> Result<Tensor, SegReduceError> {
        segment::unsorted_segment_sum_op(self, segment_ids, num_segments)
    }

    pub fn sparse_segment_sum(&self, indices: &Tensor, segment_ids: &Tensor) -> Result<Tensor, SegReduceError> {
        segment::sparse_segment_sum_op(self, indices, segment_ids)
    }

    pub fn sparse_segment_mean(&self, indices: &Tensor, segment_ids: &Tensor) -> Result<Tensor, SegReduceError> {
        segment::sparse_segment_mean_op(self, indices, segment_ids)
    }

    pub fn sparse_segment_sqrtn(&self, indices: &Tensor, segment_ids: &Tensor) -> Result<Tensor, SegReduceError> {
        segment::sparse_segment_sqrtn_op(self, indices, segment_ids)
    }

    /// Sparse segment reduction with an explicit mode, segment count and executor.
    /// Delegates to `ops::segment::sparse_segment_reduce_op`.
    pub fn sparse_segment_reduce(
        &self,
        indices: &Tensor,
        segment_ids: &Tensor,
        mode: ReductionMode,
        num_segments: Option<usize>,
        executor: &Executor,
    ) -> Result<Tensor, SegReduceError> {
        segment::sparse_segment_reduce_op(self, indices, segment_ids, mode, num_segments, executor)
    }

    /// Treats `self` as the upstream gradient of a sparse segment reduction
    /// and returns the gradient for its `output_dim0` source rows.
    pub fn sparse_segment_grad(
        &self,
        indices: &Tensor,
        segment_ids: &Tensor,
        mode: ReductionMode,
        output_dim0: usize,
    ) -> Result<Tensor, SegReduceError> {
        segment::sparse_segment_reduce_grad_op(
            self,
            indices,
            segment_ids,
            mode,
            output_dim0,
            None,
            &Executor::default(),
        )
    }
}
