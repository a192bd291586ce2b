//! Operations exposed by the crate.
//!
//! Each operation is available as a slice-level reducer, as a tensor-level
//! `*_op` function with dtype dispatch, and as a `Tensor` method.

pub mod segment;
