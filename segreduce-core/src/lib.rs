//! Segment reduction engine.
//!
//! Combines rows of a dense array according to per-row segment ids: sorted
//! segment sum/mean, unsorted segment sum, and sparse (gather-then-reduce)
//! segment sum/mean/sqrt-n together with the sparse gradient.
//!
//! ```
//! use segreduce_core::{from_vec_f32, from_vec_i32};
//!
//! let data = from_vec_f32(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![3, 2]).unwrap();
//! let ids = from_vec_i32(vec![0, 0, 1], vec![3]).unwrap();
//! let out = data.segment_sum(&ids).unwrap();
//! assert_eq!(out.shape(), vec![2, 2]);
//! assert_eq!(out.get_f32_data().unwrap(), vec![4.0, 6.0, 5.0, 6.0]);
//! ```

pub mod buffer;
pub mod config;
pub mod error;
pub mod ops;
pub mod tensor;
pub mod tensor_data;
pub mod types;
#[cfg(test)]
pub(crate) mod utils;

pub use config::{Executor, ReductionConfig};
pub use error::SegReduceError;
pub use ops::segment::{
    ReductionMode, RowBuffer, RowView, SegmentFloat, SegmentIndex, SortedSegmentReducer, SparseSegmentGradReducer,
    SparseSegmentReducer, UnsortedSegmentReducer,
};
pub use tensor::{from_vec_f32, from_vec_f64, from_vec_i32, from_vec_i64, zeros, zeros_f64, Tensor};
pub use types::DType;
// Re-export traits required by public functions/structs
pub use num_traits;
