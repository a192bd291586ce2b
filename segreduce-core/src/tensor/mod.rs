// src/tensor/mod.rs

use crate::error::SegReduceError;
use crate::tensor_data::TensorData;
use std::sync::{Arc, RwLock};

mod accessors;
pub mod create;
mod segment_methods;
mod traits;
pub mod utils;

// Re-export creation functions to make them public
pub use create::{from_vec_f32, from_vec_f64, from_vec_i32, from_vec_i64, zeros, zeros_f64};

/// Represents a multi-dimensional array (tensor) resident in main memory.
///
/// `Tensor` uses `Arc<RwLock<TensorData>>` internally so clones are cheap and
/// can be handed to reduction workers on other threads. The reduction engine
/// only ever takes read locks; outputs are fresh tensors.
pub struct Tensor {
    /// Arc for shared ownership, RwLock for thread-safe access to TensorData.
    pub(crate) data: Arc<RwLock<TensorData>>,
}

impl Tensor {
    fn from_tensor_data(tensor_data: TensorData) -> Self {
        Tensor {
            data: Arc::new(RwLock::new(tensor_data)),
        }
    }

    /// Creates a new Tensor with the given f32 data and shape.
    ///
    /// This is the primary constructor for creating tensors from raw data.
    /// It calculates contiguous strides automatically.
    pub fn new(data_vec: Vec<f32>, shape: Vec<usize>) -> Result<Self, SegReduceError> {
        TensorData::new(data_vec, shape).map(Self::from_tensor_data)
    }

    /// Creates a new F64 Tensor with the given data and shape.
    pub fn new_f64(data_vec: Vec<f64>, shape: Vec<usize>) -> Result<Self, SegReduceError> {
        TensorData::new_f64(data_vec, shape).map(Self::from_tensor_data)
    }

    /// Creates a new I32 Tensor, typically holding segment ids or gather indices.
    pub fn new_i32(data_vec: Vec<i32>, shape: Vec<usize>) -> Result<Self, SegReduceError> {
        TensorData::new_i32(data_vec, shape).map(Self::from_tensor_data)
    }

    /// Creates a new I64 Tensor, typically holding segment ids or gather indices.
    pub fn new_i64(data_vec: Vec<i64>, shape: Vec<usize>) -> Result<Self, SegReduceError> {
        TensorData::new_i64(data_vec, shape).map(Self::from_tensor_data)
    }

    /// Acquires a read lock on the tensor's data.
    ///
    /// The lock is automatically released when the guard goes out of scope.
    /// Panics if the RwLock is poisoned.
    pub fn read_data(&self) -> std::sync::RwLockReadGuard<'_, TensorData> {
        self.data.read().expect("RwLock poisoned")
    }
}
