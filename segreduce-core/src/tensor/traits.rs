// src/tensor/traits.rs

use crate::tensor::Tensor;
use std::fmt::{self, Debug};
use std::sync::Arc;

impl Clone for Tensor {
    /// Shallow clone: increases the reference count of the shared data.
    fn clone(&self) -> Self {
        Tensor { data: Arc::clone(&self.data) }
    }
}

impl Debug for Tensor {
    /// Shows shape, dtype, strides and offset without dumping the buffer.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let td = self.read_data();
        write!(
            f,
            "Tensor(shape={:?}, dtype={:?}, strides={:?}, offset={}, data=[... ~{} elements ...])",
            td.shape,
            td.dtype,
            td.strides,
            td.offset,
            td.numel()
        )
    }
}
