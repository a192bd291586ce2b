use std::sync::Arc;

use crate::error::SegReduceError;
use crate::types::DType;

/// Enum representing the typed storage behind a tensor.
/// This allows TensorData to hold different kinds of data buffers.
#[derive(Debug, Clone)]
pub enum Buffer {
    /// Data resides in main memory.
    Cpu(CpuBuffer),
}

/// Enum for CPU-specific buffer types.
#[derive(Debug, Clone)]
pub enum CpuBuffer {
    F32(Arc<Vec<f32>>),
    F64(Arc<Vec<f64>>),
    I32(Arc<Vec<i32>>),
    I64(Arc<Vec<i64>>),
}

impl CpuBuffer {
    pub fn dtype(&self) -> DType {
        match self {
            CpuBuffer::F32(_) => DType::F32,
            CpuBuffer::F64(_) => DType::F64,
            CpuBuffer::I32(_) => DType::I32,
            CpuBuffer::I64(_) => DType::I64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            CpuBuffer::F32(v) => v.len(),
            CpuBuffer::F64(v) => v.len(),
            CpuBuffer::I32(v) => v.len(),
            CpuBuffer::I64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

macro_rules! try_get_cpu {
    ($name:ident, $variant:ident, $ty:ty) => {
        /// Attempts to get a reference to the underlying `Arc<Vec<_>>` for this element type.
        ///
        /// Returns `DataTypeMismatch` if the buffer holds another type.
        pub fn $name(&self) -> Result<&Arc<Vec<$ty>>, SegReduceError> {
            match self {
                Buffer::Cpu(CpuBuffer::$variant(data_arc)) => Ok(data_arc),
                Buffer::Cpu(other) => Err(SegReduceError::DataTypeMismatch {
                    expected: DType::$variant,
                    actual: other.dtype(),
                    operation: stringify!($name).to_string(),
                }),
            }
        }
    };
}

impl Buffer {
    try_get_cpu!(try_get_cpu_f32, F32, f32);
    try_get_cpu!(try_get_cpu_f64, F64, f64);
    try_get_cpu!(try_get_cpu_i32, I32, i32);
    try_get_cpu!(try_get_cpu_i64, I64, i64);

    pub fn dtype(&self) -> DType {
        match self {
            Buffer::Cpu(cpu) => cpu.dtype(),
        }
    }
}
