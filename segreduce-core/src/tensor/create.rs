// src/tensor/create.rs

use crate::error::SegReduceError;
use crate::tensor::Tensor;

/// Creates a new F32 tensor filled with zeros with the specified shape.
pub fn zeros(shape: &[usize]) -> Result<Tensor, SegReduceError> {
    let numel = shape.iter().product();
    Tensor::new(vec![0.0; numel], shape.to_vec())
}

/// Creates a new F64 tensor filled with zeros with the specified shape.
pub fn zeros_f64(shape: &[usize]) -> Result<Tensor, SegReduceError> {
    let numel = shape.iter().product();
    Tensor::new_f64(vec![0.0; numel], shape.to_vec())
}

/// Creates a new F32 Tensor from a Vec<f32> and shape.
pub fn from_vec_f32(data_vec: Vec<f32>, shape: Vec<usize>) -> Result<Tensor, SegReduceError> {
    Tensor::new(data_vec, shape)
}

/// Creates a new F64 Tensor from a Vec<f64> and shape.
pub fn from_vec_f64(data_vec: Vec<f64>, shape: Vec<usize>) -> Result<Tensor, SegReduceError> {
    Tensor::new_f64(data_vec, shape)
}

/// Creates a new I32 Tensor from a Vec<i32> and shape.
pub fn from_vec_i32(data_vec: Vec<i32>, shape: Vec<usize>) -> Result<Tensor, SegReduceError> {
    Tensor::new_i32(data_vec, shape)
}

/// Creates a new I64 Tensor from a Vec<i64> and shape.
pub fn from_vec_i64(data_vec: Vec<i64>, shape: Vec<usize>) -> Result<Tensor, SegReduceError> {
    Tensor::new_i64(data_vec, shape)
}
