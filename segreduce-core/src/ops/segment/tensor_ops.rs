//! Tensor-level entry points: dtype dispatch around the slice-level reducers.
//!
//! Data tensors must be contiguous `F32`/`F64` of rank >= 1; the first axis is
//! the row axis and all trailing axes are reduced together as one row. Segment
//! ids and indices must be contiguous rank-1 `I32`/`I64` tensors, chosen
//! independently of each other. Outputs keep the data dtype and the input's
//! trailing dimensions.

use crate::config::Executor;
use crate::error::SegReduceError;
use crate::ops::segment::element::{SegmentFloat, SegmentIndex};
use crate::ops::segment::mode::ReductionMode;
use crate::ops::segment::rows::RowView;
use crate::ops::segment::sorted::SortedSegmentReducer;
use crate::ops::segment::sparse::SparseSegmentReducer;
use crate::ops::segment::sparse_grad::SparseSegmentGradReducer;
use crate::ops::segment::unsorted::UnsortedSegmentReducer;
use crate::tensor::utils::split_rows;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;
use crate::types::DType;
use std::sync::Arc;

macro_rules! dispatch_float {
    ($dtype:expr, $operation:expr, $t:ident => $body:expr) => {
        match $dtype {
            DType::F32 => {
                type $t = f32;
                $body
            }
            DType::F64 => {
                type $t = f64;
                $body
            }
            other => Err(SegReduceError::DataTypeMismatch {
                expected: DType::F32,
                actual: other,
                operation: format!("{} (data must be F32 or F64)", $operation),
            }),
        }
    };
}

macro_rules! dispatch_index {
    ($dtype:expr, $operation:expr, $what:expr, $i:ident => $body:expr) => {
        match $dtype {
            DType::I32 => {
                type $i = i32;
                $body
            }
            DType::I64 => {
                type $i = i64;
                $body
            }
            other => Err(SegReduceError::DataTypeMismatch {
                expected: DType::I64,
                actual: other,
                operation: format!("{} ({} must be I32 or I64)", $operation, $what),
            }),
        }
    };
}

fn ensure_contiguous(guard: &TensorData, what: &str, operation: &str) -> Result<(), SegReduceError> {
    if !guard.is_contiguous() {
        return Err(SegReduceError::UnsupportedOperation(format!(
            "{}: {} must be contiguous (shape {:?}, strides {:?})",
            operation, what, guard.shape, guard.strides
        )));
    }
    Ok(())
}

/// Row data pulled out of a float tensor. Holds its own reference to the
/// buffer so no lock is kept while the reduction runs.
struct FloatInput<T> {
    buffer: Arc<Vec<T>>,
    offset: usize,
    rows: usize,
    cols: usize,
    shape: Vec<usize>,
}

impl<T: SegmentFloat> FloatInput<T> {
    fn read(tensor: &Tensor, operation: &str) -> Result<Self, SegReduceError> {
        let guard = tensor.read_data();
        ensure_contiguous(&guard, "data", operation)?;
        let (rows, cols) = split_rows(&guard.shape, operation)?;
        let buffer = Arc::clone(T::cpu_data(guard.buffer())?);
        Ok(FloatInput {
            buffer,
            offset: guard.offset,
            rows,
            cols,
            shape: guard.shape.clone(),
        })
    }

    fn view(&self) -> Result<RowView<'_, T>, SegReduceError> {
        let len = self.rows * self.cols;
        RowView::new(&self.buffer[self.offset..self.offset + len], self.rows, self.cols)
    }
}

struct IndexInput<I> {
    buffer: Arc<Vec<I>>,
    offset: usize,
    len: usize,
}

impl<I: SegmentIndex> IndexInput<I> {
    fn read(tensor: &Tensor, what: &str, operation: &str) -> Result<Self, SegReduceError> {
        let guard = tensor.read_data();
        if guard.shape.len() != 1 {
            return Err(SegReduceError::ShapeMismatch {
                expected: format!("{} of rank 1", what),
                actual: format!("shape {:?}", guard.shape),
                operation: operation.to_string(),
            });
        }
        ensure_contiguous(&guard, what, operation)?;
        let buffer = Arc::clone(I::cpu_data(guard.buffer())?);
        Ok(IndexInput {
            buffer,
            offset: guard.offset,
            len: guard.shape[0],
        })
    }

    fn as_slice(&self) -> &[I] {
        &self.buffer[self.offset..self.offset + self.len]
    }
}

fn sorted_typed<T: SegmentFloat, I: SegmentIndex>(
    data: &Tensor,
    segment_ids: &Tensor,
    mode: ReductionMode,
    num_segments: Option<usize>,
    executor: &Executor,
    operation: &str,
) -> Result<Tensor, SegReduceError> {
    let input = FloatInput::<T>::read(data, operation)?;
    let ids = IndexInput::<I>::read(segment_ids, "segment_ids", operation)?;
    SortedSegmentReducer::new(executor.clone())
        .reduce(input.view()?, ids.as_slice(), mode, num_segments)?
        .into_tensor(&input.shape)
}

fn unsorted_typed<T: SegmentFloat, I: SegmentIndex>(
    data: &Tensor,
    segment_ids: &Tensor,
    num_segments: usize,
    executor: &Executor,
    operation: &str,
) -> Result<Tensor, SegReduceError> {
    let input = FloatInput::<T>::read(data, operation)?;
    let ids = IndexInput::<I>::read(segment_ids, "segment_ids", operation)?;
    UnsortedSegmentReducer::new(executor.clone())
        .reduce(input.view()?, ids.as_slice(), num_segments)?
        .into_tensor(&input.shape)
}

fn sparse_typed<T: SegmentFloat, I: SegmentIndex, S: SegmentIndex>(
    data: &Tensor,
    indices: &Tensor,
    segment_ids: &Tensor,
    mode: ReductionMode,
    num_segments: Option<usize>,
    executor: &Executor,
    operation: &str,
) -> Result<Tensor, SegReduceError> {
    let input = FloatInput::<T>::read(data, operation)?;
    let indices = IndexInput::<I>::read(indices, "indices", operation)?;
    let ids = IndexInput::<S>::read(segment_ids, "segment_ids", operation)?;
    SparseSegmentReducer::new(executor.clone())
        .reduce(input.view()?, indices.as_slice(), ids.as_slice(), mode, num_segments)?
        .into_tensor(&input.shape)
}

#[allow(clippy::too_many_arguments)]
fn sparse_grad_typed<T: SegmentFloat, I: SegmentIndex, S: SegmentIndex>(
    grad: &Tensor,
    indices: &Tensor,
    segment_ids: &Tensor,
    mode: ReductionMode,
    output_dim0: usize,
    num_segments: Option<usize>,
    executor: &Executor,
    operation: &str,
) -> Result<Tensor, SegReduceError> {
    let input = FloatInput::<T>::read(grad, operation)?;
    let indices = IndexInput::<I>::read(indices, "indices", operation)?;
    let ids = IndexInput::<S>::read(segment_ids, "segment_ids", operation)?;
    SparseSegmentGradReducer::new(executor.clone())
        .reduce(input.view()?, indices.as_slice(), ids.as_slice(), mode, output_dim0, num_segments)?
        .into_tensor(&input.shape)
}

/// Sorted segment reduction of `data` by non-decreasing `segment_ids`.
///
/// `num_segments` fixes the output row count; when `None` it is
/// `segment_ids[R-1] + 1`.
///
/// # Errors
/// `MalformedSegmentIds` on a descending id step, `SegmentIdOutOfRange` for a
/// negative id (or one beyond an explicit `num_segments`), `ShapeMismatch` when
/// the id count differs from the row count, and dtype/layout errors.
pub fn segment_reduce_op(
    data: &Tensor,
    segment_ids: &Tensor,
    mode: ReductionMode,
    num_segments: Option<usize>,
    executor: &Executor,
) -> Result<Tensor, SegReduceError> {
    let operation = format!("segment_{}", mode.name());
    let (data_dtype, ids_dtype) = (data.dtype(), segment_ids.dtype());
    dispatch_float!(data_dtype, operation, T => {
        dispatch_index!(ids_dtype, operation, "segment_ids", I => {
            sorted_typed::<T, I>(data, segment_ids, mode, num_segments, executor, &operation)
        })
    })
}

/// Sums runs of rows sharing a segment id. See [`segment_reduce_op`].
pub fn segment_sum_op(data: &Tensor, segment_ids: &Tensor) -> Result<Tensor, SegReduceError> {
    segment_reduce_op(data, segment_ids, ReductionMode::Sum, None, &Executor::default())
}

/// Averages runs of rows sharing a segment id. Empty segments stay zero.
pub fn segment_mean_op(data: &Tensor, segment_ids: &Tensor) -> Result<Tensor, SegReduceError> {
    segment_reduce_op(data, segment_ids, ReductionMode::Mean, None, &Executor::default())
}

/// Like [`segment_sum_op`] with an explicit output row count.
pub fn segment_sum_with_num_segments_op(
    data: &Tensor,
    segment_ids: &Tensor,
    num_segments: usize,
) -> Result<Tensor, SegReduceError> {
    segment_reduce_op(data, segment_ids, ReductionMode::Sum, Some(num_segments), &Executor::default())
}

/// Unsorted segment sum on a caller-provided executor.
///
/// Rows whose id falls outside `[0, num_segments)` are skipped.
pub fn unsorted_segment_sum_with_executor(
    data: &Tensor,
    segment_ids: &Tensor,
    num_segments: usize,
    executor: &Executor,
) -> Result<Tensor, SegReduceError> {
    let operation = "unsorted_segment_sum";
    let (data_dtype, ids_dtype) = (data.dtype(), segment_ids.dtype());
    dispatch_float!(data_dtype, operation, T => {
        dispatch_index!(ids_dtype, operation, "segment_ids", I => {
            unsorted_typed::<T, I>(data, segment_ids, num_segments, executor, operation)
        })
    })
}

/// Sums rows into `num_segments` output rows by arbitrary (unsorted) ids.
pub fn unsorted_segment_sum_op(
    data: &Tensor,
    segment_ids: &Tensor,
    num_segments: usize,
) -> Result<Tensor, SegReduceError> {
    unsorted_segment_sum_with_executor(data, segment_ids, num_segments, &Executor::default())
}

/// Sparse segment reduction: reduces `data[indices[k]]` into row `segment_ids[k]`.
///
/// Ids outside `[0, num_segments)` are dropped; `num_segments` defaults to
/// `segment_ids[I-1] + 1`.
///
/// # Errors
/// `IndexOutOfRange` for an index outside `[0, R)`, `MalformedSegmentIds` on a
/// descending id step, `ShapeMismatch` when `indices` and `segment_ids`
/// differ in length, and dtype/layout errors.
pub fn sparse_segment_reduce_op(
    data: &Tensor,
    indices: &Tensor,
    segment_ids: &Tensor,
    mode: ReductionMode,
    num_segments: Option<usize>,
    executor: &Executor,
) -> Result<Tensor, SegReduceError> {
    let operation = format!("sparse_segment_{}", mode.name());
    let (data_dtype, indices_dtype, ids_dtype) = (data.dtype(), indices.dtype(), segment_ids.dtype());
    dispatch_float!(data_dtype, operation, T => {
        dispatch_index!(indices_dtype, operation, "indices", I => {
            dispatch_index!(ids_dtype, operation, "segment_ids", S => {
                sparse_typed::<T, I, S>(data, indices, segment_ids, mode, num_segments, executor, &operation)
            })
        })
    })
}

pub fn sparse_segment_sum_op(data: &Tensor, indices: &Tensor, segment_ids: &Tensor) -> Result<Tensor, SegReduceError> {
    sparse_segment_reduce_op(data, indices, segment_ids, ReductionMode::Sum, None, &Executor::default())
}

pub fn sparse_segment_mean_op(data: &Tensor, indices: &Tensor, segment_ids: &Tensor) -> Result<Tensor, SegReduceError> {
    sparse_segment_reduce_op(data, indices, segment_ids, ReductionMode::Mean, None, &Executor::default())
}

pub fn sparse_segment_sqrtn_op(data: &Tensor, indices: &Tensor, segment_ids: &Tensor) -> Result<Tensor, SegReduceError> {
    sparse_segment_reduce_op(data, indices, segment_ids, ReductionMode::SqrtN, None, &Executor::default())
}

pub fn sparse_segment_sum_with_num_segments_op(
    data: &Tensor,
    indices: &Tensor,
    segment_ids: &Tensor,
    num_segments: usize,
) -> Result<Tensor, SegReduceError> {
    sparse_segment_reduce_op(data, indices, segment_ids, ReductionMode::Sum, Some(num_segments), &Executor::default())
}

pub fn sparse_segment_mean_with_num_segments_op(
    data: &Tensor,
    indices: &Tensor,
    segment_ids: &Tensor,
    num_segments: usize,
) -> Result<Tensor, SegReduceError> {
    sparse_segment_reduce_op(data, indices, segment_ids, ReductionMode::Mean, Some(num_segments), &Executor::default())
}

pub fn sparse_segment_sqrtn_with_num_segments_op(
    data: &Tensor,
    indices: &Tensor,
    segment_ids: &Tensor,
    num_segments: usize,
) -> Result<Tensor, SegReduceError> {
    sparse_segment_reduce_op(data, indices, segment_ids, ReductionMode::SqrtN, Some(num_segments), &Executor::default())
}

/// Gradient of the sparse segment reduction with respect to `data`.
///
/// `grad` has one row per forward segment; the result has `output_dim0` rows
/// (the forward `R`) and the trailing dimensions of `grad`. When
/// `num_segments` is given, `grad` must have exactly that many rows.
pub fn sparse_segment_reduce_grad_op(
    grad: &Tensor,
    indices: &Tensor,
    segment_ids: &Tensor,
    mode: ReductionMode,
    output_dim0: usize,
    num_segments: Option<usize>,
    executor: &Executor,
) -> Result<Tensor, SegReduceError> {
    let operation = format!("sparse_segment_{}_grad", mode.name());
    let (grad_dtype, indices_dtype, ids_dtype) = (grad.dtype(), indices.dtype(), segment_ids.dtype());
    dispatch_float!(grad_dtype, operation, T => {
        dispatch_index!(indices_dtype, operation, "indices", I => {
            dispatch_index!(ids_dtype, operation, "segment_ids", S => {
                sparse_grad_typed::<T, I, S>(
                    grad, indices, segment_ids, mode, output_dim0, num_segments, executor, &operation,
                )
            })
        })
    })
}

pub fn sparse_segment_sum_grad_op(
    grad: &Tensor,
    indices: &Tensor,
    segment_ids: &Tensor,
    output_dim0: usize,
) -> Result<Tensor, SegReduceError> {
    sparse_segment_reduce_grad_op(grad, indices, segment_ids, ReductionMode::Sum, output_dim0, None, &Executor::default())
}

pub fn sparse_segment_mean_grad_op(
    grad: &Tensor,
    indices: &Tensor,
    segment_ids: &Tensor,
    output_dim0: usize,
) -> Result<Tensor, SegReduceError> {
    sparse_segment_reduce_grad_op(grad, indices, segment_ids, ReductionMode::Mean, output_dim0, None, &Executor::default())
}

pub fn sparse_segment_sqrtn_grad_op(
    grad: &Tensor,
    indices: &Tensor,
    segment_ids: &Tensor,
    output_dim0: usize,
) -> Result<Tensor, SegReduceError> {
    sparse_segment_reduce_grad_op(grad, indices, segment_ids, ReductionMode::SqrtN, output_dim0, None, &Executor::default())
}
