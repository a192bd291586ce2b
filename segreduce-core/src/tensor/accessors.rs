// src/tensor/accessors.rs
use crate::{error::SegReduceError, tensor::Tensor, types::DType};

macro_rules! get_data {
    ($name:ident, $getter:ident, $ty:ty) => {
        /// Copies the tensor elements into an owned `Vec` in row-major order.
        ///
        /// Returns an error if the tensor holds another data type or is not contiguous.
        pub fn $name(&self) -> Result<Vec<$ty>, SegReduceError> {
            let guard = self.read_data();
            if !guard.is_contiguous() {
                return Err(SegReduceError::UnsupportedOperation(format!(
                    "{} on non-contiguous tensor (strides {:?})",
                    stringify!($name),
                    guard.strides
                )));
            }
            let buffer_arc = guard.buffer().$getter()?;
            let numel = guard.numel();
            Ok(buffer_arc[guard.offset..guard.offset + numel].to_vec())
        }
    };
}

impl Tensor {
    /// Returns a clone of the tensor's shape (dimensions).
    pub fn shape(&self) -> Vec<usize> {
        self.read_data().shape.clone()
    }

    /// Returns a clone of the tensor's strides.
    pub fn strides(&self) -> Vec<usize> {
        self.read_data().strides.clone()
    }

    /// Returns the data type (`DType`) of the tensor elements.
    pub fn dtype(&self) -> DType {
        self.read_data().dtype
    }

    /// Returns the rank (number of dimensions) of the tensor.
    pub fn rank(&self) -> usize {
        self.read_data().shape.len()
    }

    /// Returns the total number of elements in the tensor.
    pub fn numel(&self) -> usize {
        self.read_data().numel()
    }

    /// Checks if the tensor is contiguous in memory (row-major order).
    pub fn is_contiguous(&self) -> bool {
        self.read_data().is_contiguous()
    }

    get_data!(get_f32_data, try_get_cpu_f32, f32);
    get_data!(get_f64_data, try_get_cpu_f64, f64);
    get_data!(get_i32_data, try_get_cpu_i32, i32);
    get_data!(get_i64_data, try_get_cpu_i64, i64);
}
