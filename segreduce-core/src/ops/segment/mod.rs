//! Segment reductions: combine rows of a 2-D (or higher) array according to a
//! per-row group label.
//!
//! Three families share one set of row primitives:
//! - sorted: rows are grouped by a non-decreasing id sequence ([`SortedSegmentReducer`]),
//! - unsorted: ids arrive in any order and the group count is given ([`UnsortedSegmentReducer`]),
//! - sparse: rows are gathered through an index array first ([`SparseSegmentReducer`]),
//!   with its gradient in [`SparseSegmentGradReducer`].
//!
//! Segment ids mask (an out-of-range id drops its row) on every path except the
//! dense sorted one, which addresses output rows directly and rejects them.
//! Gather indices never mask: an index outside the source rows is an error.

pub mod element;
mod layout;
pub mod mode;
pub mod rows;
mod scatter;
pub mod sorted;
pub mod sparse;
pub mod sparse_grad;
pub mod tensor_ops;
pub mod unsorted;

pub use element::{SegmentFloat, SegmentIndex};
pub use mode::ReductionMode;
pub use rows::{RowBuffer, RowView};
pub use sorted::SortedSegmentReducer;
pub use sparse::SparseSegmentReducer;
pub use sparse_grad::SparseSegmentGradReducer;
pub use tensor_ops::*;
pub use unsorted::UnsortedSegmentReducer;

#[cfg(test)]
mod sorted_test;
#[cfg(test)]
mod unsorted_test;
