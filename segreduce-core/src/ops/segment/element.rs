//! Element traits for the segment kernels.
//!
//! Data rows are `f32` or `f64`; segment ids and gather indices are `i32` or `i64`,
//! chosen independently of each other.

use crate::buffer::Buffer;
use crate::error::SegReduceError;
use crate::tensor::Tensor;
use crate::types::DType;
use num_traits::Float;
use std::fmt::Debug;
use std::ops::AddAssign;
use std::sync::Arc;

/// A floating-point element type that segment reductions can be applied to.
///
/// Sums are carried in `Acc`, which is at least as wide as `Self`, so long runs
/// of narrow values do not lose precision before the final narrowing store.
pub trait SegmentFloat: Float + Debug + Send + Sync + 'static {
    /// Accumulator type used while summing a run or scattering rows.
    type Acc: Float + AddAssign + Debug + Send + Sync + 'static;

    const DTYPE: DType;

    fn widen(self) -> Self::Acc;

    fn narrow(acc: Self::Acc) -> Self;

    /// Converts a row count into the accumulator type.
    fn count_to_acc(count: usize) -> Self::Acc;

    /// Borrows the typed CPU storage of a buffer.
    fn cpu_data(buffer: &Buffer) -> Result<&Arc<Vec<Self>>, SegReduceError>;

    /// Wraps an owned vector into a tensor of this element type.
    fn into_tensor(data: Vec<Self>, shape: Vec<usize>) -> Result<Tensor, SegReduceError>;
}

impl SegmentFloat for f32 {
    type Acc = f64;

    const DTYPE: DType = DType::F32;

    #[inline]
    fn widen(self) -> f64 {
        self as f64
    }

    #[inline]
    fn narrow(acc: f64) -> f32 {
        acc as f32
    }

    #[inline]
    fn count_to_acc(count: usize) -> f64 {
        count as f64
    }

    fn cpu_data(buffer: &Buffer) -> Result<&Arc<Vec<f32>>, SegReduceError> {
        buffer.try_get_cpu_f32()
    }

    fn into_tensor(data: Vec<f32>, shape: Vec<usize>) -> Result<Tensor, SegReduceError> {
        Tensor::new(data, shape)
    }
}

impl SegmentFloat for f64 {
    type Acc = f64;

    const DTYPE: DType = DType::F64;

    #[inline]
    fn widen(self) -> f64 {
        self
    }

    #[inline]
    fn narrow(acc: f64) -> f64 {
        acc
    }

    #[inline]
    fn count_to_acc(count: usize) -> f64 {
        count as f64
    }

    fn cpu_data(buffer: &Buffer) -> Result<&Arc<Vec<f64>>, SegReduceError> {
        buffer.try_get_cpu_f64()
    }

    fn into_tensor(data: Vec<f64>, shape: Vec<usize>) -> Result<Tensor, SegReduceError> {
        Tensor::new_f64(data, shape)
    }
}

/// A signed fixed-width integer used for segment ids and gather indices.
pub trait SegmentIndex: Copy + Debug + Send + Sync + 'static {
    const DTYPE: DType;

    fn as_i64(self) -> i64;

    fn cpu_data(buffer: &Buffer) -> Result<&Arc<Vec<Self>>, SegReduceError>;
}

impl SegmentIndex for i32 {
    const DTYPE: DType = DType::I32;

    #[inline]
    fn as_i64(self) -> i64 {
        self as i64
    }

    fn cpu_data(buffer: &Buffer) -> Result<&Arc<Vec<i32>>, SegReduceError> {
        buffer.try_get_cpu_i32()
    }
}

impl SegmentIndex for i64 {
    const DTYPE: DType = DType::I64;

    #[inline]
    fn as_i64(self) -> i64 {
        self
    }

    fn cpu_data(buffer: &Buffer) -> Result<&Arc<Vec<i64>>, SegReduceError> {
        buffer.try_get_cpu_i64()
    }
}
