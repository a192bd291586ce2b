use crate::error::SegReduceError;

/// Calculates the strides for a given shape.
/// Strides represent the number of elements to skip in the flattened data array
/// to move one step along each dimension.
///
/// Example:
/// shape = [2, 3] -> strides = [3, 1]
/// shape = [2, 2, 2] -> strides = [4, 2, 1]
pub fn calculate_strides(shape: &[usize]) -> Vec<usize> {
    if shape.is_empty() {
        return vec![];
    }
    let rank = shape.len();
    let mut strides = vec![1; rank];
    for i in (0..rank - 1).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }
    strides
}

/// Splits a shape `[R, C0, C1, ...]` into the row count `R` and the flattened
/// row width `C = C0 * C1 * ...`.
///
/// Rank-0 shapes have no row axis and are rejected.
pub fn split_rows(shape: &[usize], operation: &str) -> Result<(usize, usize), SegReduceError> {
    match shape.split_first() {
        Some((&rows, tail)) => Ok((rows, tail.iter().product())),
        None => Err(SegReduceError::ShapeMismatch {
            expected: "tensor of rank >= 1".to_string(),
            actual: "scalar (rank 0)".to_string(),
            operation: operation.to_string(),
        }),
    }
}

/// Builds the output shape `[rows, C0, C1, ...]` from the input's trailing dimensions.
pub fn with_leading_dim(shape: &[usize], rows: usize) -> Vec<usize> {
    let mut out = Vec::with_capacity(shape.len().max(1));
    out.push(rows);
    out.extend_from_slice(shape.get(1..).unwrap_or(&[]));
    out
}
