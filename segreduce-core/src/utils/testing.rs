use crate::tensor::Tensor;
use crate::types::DType;

/// Checks that a float tensor has the expected shape and data within `tolerance`.
///
/// Works for `F32` and `F64` tensors; `F32` data is compared after widening.
/// Panics with the first mismatching position.
pub fn check_tensor_near(actual: &Tensor, expected_shape: &[usize], expected_data: &[f64], tolerance: f64) {
    assert_eq!(actual.shape(), expected_shape, "Shape mismatch");

    let actual_data: Vec<f64> = match actual.dtype() {
        DType::F32 => actual
            .get_f32_data()
            .expect("Failed to get F32 data in check_tensor_near")
            .into_iter()
            .map(f64::from)
            .collect(),
        DType::F64 => actual
            .get_f64_data()
            .expect("Failed to get F64 data in check_tensor_near"),
        other => panic!("check_tensor_near called on {:?} tensor", other),
    };

    assert_eq!(actual_data.len(), expected_data.len(), "Data length mismatch");

    for (i, (a, e)) in actual_data.iter().zip(expected_data.iter()).enumerate() {
        let diff = (a - e).abs();
        if diff > tolerance {
            panic!(
                "Data mismatch at index {}: actual={:?}, expected={:?}, diff={:?}, tolerance={:?}",
                i, a, e, diff, tolerance
            );
        }
    }
}

/// Helper to create a simple f32 tensor for testing purposes.
pub(crate) fn create_test_tensor(data: Vec<f32>, shape: Vec<usize>) -> Tensor {
    Tensor::new(data, shape).expect("Failed to create test tensor")
}

/// Helper to create a rank-1 i32 id/index tensor.
pub(crate) fn create_index_tensor(ids: Vec<i32>) -> Tensor {
    let len = ids.len();
    Tensor::new_i32(ids, vec![len]).expect("Failed to create index tensor")
}
