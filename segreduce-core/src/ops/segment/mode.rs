use crate::ops::segment::element::SegmentFloat;
use num_traits::{Float, One};

/// How the rows of a segment are combined into its output row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReductionMode {
    /// Plain sum of the rows.
    #[default]
    Sum,
    /// Sum divided by the number of rows in the segment.
    Mean,
    /// Sum divided by the square root of the number of rows in the segment.
    SqrtN,
}

impl ReductionMode {
    /// Factor applied to an upstream gradient row for a segment of `count` rows.
    ///
    /// This is the derivative of the forward normalization: `1`, `1/count` or
    /// `1/sqrt(count)`. A zero count never reaches a scatter, so it maps to one.
    pub(crate) fn gradient_scale<T: SegmentFloat>(self, count: usize) -> T::Acc {
        if count == 0 {
            return T::Acc::one();
        }
        let n = T::count_to_acc(count);
        match self {
            ReductionMode::Sum => T::Acc::one(),
            ReductionMode::Mean => n.recip(),
            ReductionMode::SqrtN => n.sqrt().recip(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ReductionMode::Sum => "sum",
            ReductionMode::Mean => "mean",
            ReductionMode::SqrtN => "sqrtn",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_gradient_scale() {
        assert_relative_eq!(ReductionMode::Sum.gradient_scale::<f32>(4), 1.0);
        assert_relative_eq!(ReductionMode::Mean.gradient_scale::<f32>(4), 0.25);
        assert_relative_eq!(ReductionMode::SqrtN.gradient_scale::<f64>(4), 0.5);
        assert_relative_eq!(ReductionMode::Mean.gradient_scale::<f64>(0), 1.0);
    }
}
