use crate::types::DType;
use thiserror::Error;

/// Custom error type for the segment reduction engine.
///
/// Every variant describes a broken caller contract detected before any output
/// is allocated. Dropped segment ids on the masking paths are not errors and
/// never surface here.
#[derive(Error, Debug, PartialEq, Clone)] // PartialEq for easier testing
pub enum SegReduceError {
    #[error("Shape mismatch: expected {expected}, got {actual} during operation {operation}")]
    ShapeMismatch {
        expected: String,
        actual: String,
        operation: String,
    },

    #[error("Malformed segment ids: id {current} at position {position} follows larger id {previous}")]
    MalformedSegmentIds {
        position: usize,
        previous: i64,
        current: i64,
    },

    #[error("Segment id {id} at position {position} is out of range (num_segments: {num_segments:?})")]
    SegmentIdOutOfRange {
        position: usize,
        id: i64,
        num_segments: Option<usize>,
    },

    #[error("Index out of range: indices[{position}] = {index} is not in [0, {bound})")]
    IndexOutOfRange {
        position: usize,
        index: i64,
        bound: usize,
    },

    #[error("Data type mismatch for operation '{operation}': expected {expected:?}, got {actual:?}")]
    DataTypeMismatch {
        expected: DType,
        actual: DType,
        operation: String,
    },

    #[error("Tensor creation error: data length {data_len} does not match shape {shape:?}")]
    TensorCreationError { data_len: usize, shape: Vec<usize> },

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Failed to build reduction thread pool: {0}")]
    ThreadPoolBuild(String),
}

impl From<rayon::ThreadPoolBuildError> for SegReduceError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        SegReduceError::ThreadPoolBuild(err.to_string())
    }
}
