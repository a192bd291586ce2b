//! Row views and the row-aggregation primitives shared by every reducer.

use crate::error::SegReduceError;
use crate::ops::segment::element::SegmentFloat;
use crate::ops::segment::mode::ReductionMode;
use crate::tensor::utils::with_leading_dim;
use crate::tensor::Tensor;
use num_traits::{Float, Zero};
use std::ops::AddAssign;

/// Borrowed view of a dense, row-major buffer as `rows` rows of `cols` elements.
///
/// `cols` is the product of all trailing dimensions of the original array.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a, T> {
    data: &'a [T],
    rows: usize,
    cols: usize,
}

impl<'a, T> RowView<'a, T> {
    /// Creates a view, checking that `data` holds exactly `rows * cols` elements.
    pub fn new(data: &'a [T], rows: usize, cols: usize) -> Result<Self, SegReduceError> {
        let expected = rows.checked_mul(cols);
        if expected != Some(data.len()) {
            return Err(SegReduceError::ShapeMismatch {
                expected: format!("{} elements ({} rows x {} cols)", rows.saturating_mul(cols), rows, cols),
                actual: format!("{} elements", data.len()),
                operation: "RowView::new".to_string(),
            });
        }
        Ok(RowView { data, rows, cols })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// Returns row `i`. Callers validate `i < rows` before entering a kernel.
    #[inline]
    pub fn row(&self, i: usize) -> &'a [T] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }
}

/// Owned, zero-initialized-then-filled reduction output.
#[derive(Debug, Clone, PartialEq)]
pub struct RowBuffer<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T> RowBuffer<T> {
    pub(crate) fn from_parts(data: Vec<T>, rows: usize, cols: usize) -> Self {
        debug_assert_eq!(data.len(), rows * cols);
        RowBuffer { data, rows, cols }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn row(&self, i: usize) -> &[T] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub fn view(&self) -> RowView<'_, T> {
        RowView {
            data: &self.data,
            rows: self.rows,
            cols: self.cols,
        }
    }
}

impl<T: SegmentFloat> RowBuffer<T> {
    pub(crate) fn zeros(rows: usize, cols: usize) -> Self {
        RowBuffer::from_parts(vec![T::zero(); rows * cols], rows, cols)
    }

    /// Narrows an accumulator buffer into the element type.
    pub(crate) fn from_acc(acc: Vec<T::Acc>, rows: usize, cols: usize) -> Self {
        let data = acc.into_iter().map(T::narrow).collect();
        RowBuffer::from_parts(data, rows, cols)
    }

    /// Wraps the rows into a tensor whose trailing dimensions follow `input_shape`.
    pub fn into_tensor(self, input_shape: &[usize]) -> Result<Tensor, SegReduceError> {
        let shape = with_leading_dim(input_shape, self.rows);
        T::into_tensor(self.data, shape)
    }
}

/// `acc += row`, widening each element.
#[inline]
pub(crate) fn accumulate_row<T: SegmentFloat>(acc: &mut [T::Acc], row: &[T]) {
    for (a, &v) in acc.iter_mut().zip(row) {
        *a += v.widen();
    }
}

/// `acc += scale * row`.
#[inline]
pub(crate) fn accumulate_scaled_row<T: SegmentFloat>(acc: &mut [T::Acc], row: &[T], scale: T::Acc) {
    for (a, &v) in acc.iter_mut().zip(row) {
        *a += v.widen() * scale;
    }
}

/// Writes a finished run into its output row, applying the mode's normalization.
/// `count` is the number of rows in the run and is always >= 1.
#[inline]
pub(crate) fn flush_row<T: SegmentFloat>(out: &mut [T], acc: &[T::Acc], mode: ReductionMode, count: usize) {
    match mode {
        ReductionMode::Sum => {
            for (o, &a) in out.iter_mut().zip(acc) {
                *o = T::narrow(a);
            }
        }
        ReductionMode::Mean | ReductionMode::SqrtN => {
            let n = T::count_to_acc(count);
            let divisor = if mode == ReductionMode::Mean { n } else { n.sqrt() };
            for (o, &a) in out.iter_mut().zip(acc) {
                *o = T::narrow(a / divisor);
            }
        }
    }
}

/// Element-wise `into += from` used to merge per-worker partial outputs.
pub(crate) fn merge_partials<A: AddAssign + Copy>(into: &mut [A], from: &[A]) {
    for (a, &b) in into.iter_mut().zip(from) {
        *a += b;
    }
}

pub(crate) fn reset<A: Zero + Copy>(acc: &mut [A]) {
    acc.fill(A::zero());
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_row_view_rows() {
        let data = [1.0_f32, 2.0, 3.0, 4.0, 5.0, 6.0];
        let view = RowView::new(&data, 3, 2).unwrap();
        assert_eq!(view.row(0), &[1.0, 2.0]);
        assert_eq!(view.row(2), &[5.0, 6.0]);
    }

    #[test]
    fn test_row_view_length_mismatch() {
        let data = [1.0_f64, 2.0, 3.0];
        let err = RowView::new(&data, 2, 2).unwrap_err();
        assert!(matches!(err, SegReduceError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_zero_width_rows() {
        let data: [f32; 0] = [];
        let view = RowView::new(&data, 4, 0).unwrap();
        assert_eq!(view.rows(), 4);
        assert!(view.row(3).is_empty());
    }

    #[test]
    fn test_flush_modes() {
        let acc = [6.0_f64, 8.0];
        let mut out = [0.0_f32; 2];

        flush_row::<f32>(&mut out, &acc, ReductionMode::Sum, 4);
        assert_eq!(out, [6.0, 8.0]);

        flush_row::<f32>(&mut out, &acc, ReductionMode::Mean, 4);
        assert_eq!(out, [1.5, 2.0]);

        flush_row::<f32>(&mut out, &acc, ReductionMode::SqrtN, 4);
        assert_eq!(out, [3.0, 4.0]);
    }

    #[test]
    fn test_accumulate_widens() {
        let mut acc = [0.0_f64; 2];
        accumulate_row::<f32>(&mut acc, &[0.1, 0.2]);
        accumulate_scaled_row::<f32>(&mut acc, &[1.0, 1.0], 0.5);
        assert_relative_eq!(acc[0], 0.1_f32 as f64 + 0.5, epsilon = 1e-12);
        assert_relative_eq!(acc[1], 0.2_f32 as f64 + 0.5, epsilon = 1e-12);
    }
}
