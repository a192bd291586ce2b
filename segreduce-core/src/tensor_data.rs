// src/tensor_data.rs
use std::sync::Arc;

use crate::buffer::{Buffer, CpuBuffer};
use crate::error::SegReduceError;
use crate::tensor::utils::calculate_strides;
use crate::types::DType;

/// Internal storage and metadata for a Tensor.
///
/// This struct holds the data buffer, shape, strides and data type.
/// It is wrapped in `Arc<RwLock<TensorData>>` by the `Tensor` struct
/// so tensors can be cloned cheaply and shared across reduction workers.
#[derive(Debug)]
pub struct TensorData {
    /// The underlying typed buffer, shared by views.
    pub(crate) buffer: Arc<Buffer>,
    /// The data type of the elements in the buffer.
    pub(crate) dtype: DType,
    /// The shape (dimensions) of the tensor.
    pub(crate) shape: Vec<usize>,
    /// The strides for each dimension.
    pub(crate) strides: Vec<usize>,
    /// The offset into the buffer for the first element.
    pub(crate) offset: usize,
}

impl TensorData {
    /// Creates a `TensorData` over a freshly allocated CPU buffer with contiguous strides.
    ///
    /// # Errors
    /// Returns `SegReduceError::TensorCreationError` if the buffer length does not match
    /// the number of elements implied by `shape`.
    pub(crate) fn from_cpu_buffer(cpu: CpuBuffer, shape: Vec<usize>) -> Result<Self, SegReduceError> {
        let numel: usize = shape.iter().product();
        let data_len = cpu.len();
        if data_len != numel {
            return Err(SegReduceError::TensorCreationError { data_len, shape });
        }

        let strides = calculate_strides(&shape);
        let dtype = cpu.dtype();

        Ok(TensorData {
            buffer: Arc::new(Buffer::Cpu(cpu)),
            dtype,
            shape,
            strides,
            offset: 0,
        })
    }

    pub fn new(data_vec: Vec<f32>, shape: Vec<usize>) -> Result<Self, SegReduceError> {
        Self::from_cpu_buffer(CpuBuffer::F32(Arc::new(data_vec)), shape)
    }

    pub fn new_f64(data_vec: Vec<f64>, shape: Vec<usize>) -> Result<Self, SegReduceError> {
        Self::from_cpu_buffer(CpuBuffer::F64(Arc::new(data_vec)), shape)
    }

    pub fn new_i32(data_vec: Vec<i32>, shape: Vec<usize>) -> Result<Self, SegReduceError> {
        Self::from_cpu_buffer(CpuBuffer::I32(Arc::new(data_vec)), shape)
    }

    pub fn new_i64(data_vec: Vec<i64>, shape: Vec<usize>) -> Result<Self, SegReduceError> {
        Self::from_cpu_buffer(CpuBuffer::I64(Arc::new(data_vec)), shape)
    }

    /// Returns a reference to the underlying buffer.
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }

    /// Checks whether the elements are laid out in row-major order without gaps.
    pub fn is_contiguous(&self) -> bool {
        if self.numel() == 0 {
            return true;
        }
        let mut expected_stride = 1;
        for (&dim, &stride) in self.shape.iter().zip(self.strides.iter()).rev() {
            // Size-1 dimensions never move the cursor, so their stride is irrelevant.
            if dim != 1 && stride != expected_stride {
                return false;
            }
            expected_stride *= dim;
        }
        true
    }
}
